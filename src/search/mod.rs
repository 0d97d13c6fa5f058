use crate::{appointment_index::AppointmentIndex, prelude::*};
use futures::stream::{select_all, StreamExt};
use tokio::{sync::mpsc, time::timeout};
use tokio_stream::wrappers::ReceiverStream;

mod query;

pub use query::SearchQuery;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Answers AND queries over appointments from independent single-field
/// scans.
///
/// Every predicate is scanned by its own task that delivers through its own
/// channel. The coordinator receives exactly one list per predicate and keeps
/// the appointments found in all of them.
#[derive(Debug, Clone)]
pub struct ConjunctiveSearch {
    timeout: Duration,
}

impl Default for ConjunctiveSearch {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl ConjunctiveSearch {
    /// Creates a coordinator waiting at most `timeout` for each result list.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Per-result wait limit.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Runs one scan task per predicate and intersects their results.
    ///
    /// All tasks read the same snapshot of the index, the read lock is held
    /// until the last task finishes. No predicates means no tasks and an
    /// empty result.
    /// # Errors
    /// `ErrorKind::SearchTimeout` if a result list does not arrive in time,
    /// `ErrorKind::SearchTaskFailed` if a task stops without delivering one.
    /// # Examples
    /// ```no_run
    /// use molar::{AppointmentIndex, ConjunctiveSearch, Predicate};
    /// use std::sync::Arc;
    /// use tokio::sync::RwLock;
    ///
    /// # async fn run() -> molar::Result<()> {
    /// let index = Arc::new(RwLock::new(AppointmentIndex::new()));
    /// let found = ConjunctiveSearch::default()
    ///     .run(index, vec![Predicate::Dentist("drlee".into()), Predicate::Session(2)])
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn run(
        &self,
        index: Arc<RwLock<AppointmentIndex>>,
        predicates: Vec<Predicate>,
    ) -> Result<Vec<Appointment>> {
        let active = predicates.len();
        if active == 0 {
            debug!("search without predicates, nothing to scan");
            return Ok(Vec::new());
        }
        let snapshot = Arc::new(index.read_owned().await);
        let mut receivers = Vec::with_capacity(active);
        for predicate in predicates {
            let (tx, rx) = mpsc::channel(1);
            let snapshot = snapshot.clone();
            tokio::spawn(async move {
                let found: Vec<Appointment> = snapshot
                    .search_all_by_field(&predicate)
                    .into_iter()
                    .cloned()
                    .collect();
                trace!("{} matched {} appointments", predicate, found.len());
                if tx.send(found).await.is_err() {
                    debug!("search coordinator gone before {} delivered", predicate);
                }
            });
            receivers.push(ReceiverStream::new(rx));
        }
        drop(snapshot);

        let mut results = select_all(receivers);
        let mut lists = Vec::with_capacity(active);
        for _ in 0..active {
            match timeout(self.timeout, results.next()).await {
                Ok(Some(list)) => lists.push(list),
                Ok(None) => {
                    error!("search task stopped without a result");
                    return Err(Kind::SearchTaskFailed(format!(
                        "{} of {} results received",
                        lists.len(),
                        active
                    ))
                    .into());
                }
                Err(_) => {
                    warn!("search task did not answer in {:?}", self.timeout);
                    return Err(Kind::SearchTimeout.into());
                }
            }
        }
        let found = intersect(lists, active);
        debug!("{} predicates, {} appointments match all", active, found.len());
        Ok(found)
    }
}

/// Frequency-count intersection: keeps appointments whose id appears in
/// exactly `count` of the lists, in first-seen order.
#[must_use]
pub fn intersect(lists: Vec<Vec<Appointment>>, count: usize) -> Vec<Appointment> {
    let mut frequency: HashMap<u64, usize> = HashMap::new();
    let mut first_seen = Vec::new();
    for appointment in lists.into_iter().flatten() {
        let seen = frequency.entry(appointment.id).or_insert(0);
        if *seen == 0 {
            first_seen.push(appointment);
        }
        *seen += 1;
    }
    first_seen
        .into_iter()
        .filter(|appointment| frequency.get(&appointment.id) == Some(&count))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn date(s: &str) -> Date {
        Date::parse(s).unwrap()
    }

    fn clinic_day() -> Arc<RwLock<AppointmentIndex>> {
        let mut index = AppointmentIndex::new();
        index.add(Appointment::new(1, "amy01", "drlee", date("2024-04-01"), 1));
        index.add(Appointment::new(2, "bob01", "drlee", date("2024-04-01"), 2));
        index.add(Appointment::new(3, "cara1", "drlee", date("2024-04-01"), 3));
        index.add(Appointment::new(4, "amy01", "drkim", date("2024-04-01"), 2));
        index.add(Appointment::new(5, "amy01", "drlee", date("2024-04-02"), 2));
        Arc::new(RwLock::new(index))
    }

    fn ids(found: &[Appointment]) -> Vec<u64> {
        found.iter().map(|a| a.id).collect()
    }

    #[tokio::test]
    async fn narrowing_by_session() {
        let index = clinic_day();
        let search = ConjunctiveSearch::default();
        let day = vec![
            Predicate::Dentist("drlee".into()),
            Predicate::Date(date("2024-04-01")),
        ];
        let found = search.run(index.clone(), day.clone()).await.unwrap();
        assert_eq!(ids(&found), vec![1, 2, 3]);

        let mut narrowed = day;
        narrowed.push(Predicate::Session(2));
        let found = search.run(index, narrowed).await.unwrap();
        assert_eq!(ids(&found), vec![2]);
    }

    #[tokio::test]
    async fn no_predicates_no_result() {
        let found = ConjunctiveSearch::default()
            .run(clinic_day(), Vec::new())
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn matches_sequential_intersection() {
        let mut rng = rand::thread_rng();
        let mut index = AppointmentIndex::new();
        let dentists = ["drlee", "drkim", "drong"];
        let patients = ["amy01", "bob01", "cara1", "dave1"];
        for id in 0..500 {
            let day = format!("2024-04-{:02}", rng.gen_range(1..=5));
            index.add(Appointment::new(
                id,
                patients[rng.gen_range(0..patients.len())],
                dentists[rng.gen_range(0..dentists.len())],
                date(&day),
                rng.gen_range(1..=7),
            ));
        }
        let predicates = vec![
            Predicate::Dentist("drkim".into()),
            Predicate::Patient("bob01".into()),
            Predicate::Session(4),
        ];
        let expected: Vec<u64> = index
            .iter()
            .filter(|a| predicates.iter().all(|p| p.matches(a)))
            .map(|a| a.id)
            .collect();
        let index = Arc::new(RwLock::new(index));
        let found = ConjunctiveSearch::default()
            .run(index, predicates)
            .await
            .unwrap();
        assert_eq!(ids(&found), expected);
    }

    #[test]
    fn intersect_counts_frequency() {
        let a = Appointment::new(1, "amy01", "drlee", date("2024-04-01"), 1);
        let b = Appointment::new(2, "bob01", "drlee", date("2024-04-01"), 2);
        let c = Appointment::new(3, "cara1", "drkim", date("2024-04-02"), 2);
        let lists = vec![vec![a.clone(), b.clone()], vec![b.clone(), c.clone()], vec![b.clone()]];
        assert_eq!(ids(&intersect(lists.clone(), 3)), vec![2]);
        assert_eq!(ids(&intersect(lists.clone(), 1)), vec![1, 3]);
        assert!(intersect(lists, 4).is_empty());
        assert!(intersect(Vec::new(), 0).is_empty());
    }
}
