use std::future::Future;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// How many listings the showcase cycles through
pub const SHOWCASE_SIZE: usize = 4;

/// Time each listing stays on screen
pub const ROTATE_EVERY: Duration = Duration::from_secs(4);

/// A single-item view over the first few listings
pub struct Showcase<T> {
    items: Vec<T>,
    index: usize,
}

impl<T> Showcase<T> {
    pub fn new(items: impl IntoIterator<Item = T>) -> Self {
        Self {
            items: items.into_iter().take(SHOWCASE_SIZE).collect(),
            index: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn position(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&T> {
        self.items.get(self.index)
    }

    /// Move to the next item, wrapping to the first
    pub fn advance(&mut self) {
        if !self.items.is_empty() {
            self.index = (self.index + 1) % self.items.len();
        }
    }

    /// Only a showcase with more than one item has a timer
    pub fn rotates(&self) -> bool {
        self.items.len() > 1
    }
}

/// Render the current item, then advance and re-render on every tick until
/// `stop` resolves. Returns right after the first render when nothing rotates.
pub async fn run<T, F, S>(showcase: &mut Showcase<T>, every: Duration, mut render: F, stop: S)
where
    F: FnMut(&T, usize, usize),
    S: Future<Output = ()>,
{
    let Some(first) = showcase.current() else {
        return;
    };
    render(first, showcase.position(), showcase.len());

    if !showcase.rotates() {
        return;
    }

    let mut ticker = interval_at(Instant::now() + every, every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(stop);

    loop {
        tokio::select! {
            _ = &mut stop => break,
            _ = ticker.tick() => {
                showcase.advance();
                if let Some(item) = showcase.current() {
                    render(item, showcase.position(), showcase.len());
                }
            }
        }
    }
    tracing::debug!("Showcase stopped at item {}", showcase.position());
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::oneshot;

    const FAST: Duration = Duration::from_millis(10);

    /// Run the showcase until `renders` frames have been drawn; returns the
    /// positions in the order they were shown
    async fn run_for(items: Vec<&'static str>, renders: usize) -> Vec<(usize, &'static str)> {
        let mut showcase = Showcase::new(items);
        let (tx, rx) = oneshot::channel::<()>();
        let mut tx = Some(tx);
        let mut seen = Vec::new();

        run(
            &mut showcase,
            FAST,
            |item, position, _len| {
                seen.push((position, *item));
                if seen.len() == renders {
                    if let Some(tx) = tx.take() {
                        let _ = tx.send(());
                    }
                }
            },
            async {
                let _ = rx.await;
            },
        )
        .await;
        seen
    }

    #[test]
    fn test_takes_first_four() {
        let showcase = Showcase::new(1..=10);
        assert_eq!(showcase.len(), SHOWCASE_SIZE);
        assert_eq!(showcase.current(), Some(&1));
    }

    #[test]
    fn test_advance_wraps() {
        let mut showcase = Showcase::new(["a", "b", "c"]);
        showcase.advance();
        showcase.advance();
        assert_eq!(showcase.current(), Some(&"c"));
        showcase.advance();
        assert_eq!(showcase.position(), 0);
    }

    #[test]
    fn test_empty_showcase() {
        let mut showcase: Showcase<u8> = Showcase::new([]);
        showcase.advance();
        assert!(showcase.is_empty());
        assert!(showcase.current().is_none());
        assert!(!showcase.rotates());
    }

    #[test]
    fn test_single_item_does_not_rotate() {
        assert!(!Showcase::new(["only"]).rotates());
        assert!(Showcase::new(["a", "b"]).rotates());
    }

    #[tokio::test]
    async fn test_run_cycles_and_wraps() {
        let seen = run_for(vec!["a", "b", "c", "d", "e"], 6).await;
        assert_eq!(
            seen,
            vec![(0, "a"), (1, "b"), (2, "c"), (3, "d"), (0, "a"), (1, "b")]
        );
    }

    #[tokio::test]
    async fn test_run_single_item_renders_once() {
        let mut showcase = Showcase::new(["only"]);
        let mut renders = 0;
        // stop never resolves; run must return on its own
        run(
            &mut showcase,
            FAST,
            |_, _, _| renders += 1,
            std::future::pending::<()>(),
        )
        .await;
        assert_eq!(renders, 1);
    }

    #[tokio::test]
    async fn test_run_empty_renders_nothing() {
        let mut showcase: Showcase<&str> = Showcase::new(Vec::new());
        let mut renders = 0;
        run(
            &mut showcase,
            FAST,
            |_, _, _| renders += 1,
            std::future::pending::<()>(),
        )
        .await;
        assert_eq!(renders, 0);
    }
}
