use crate::{
    lichess::{
        self,
        ResultFetcher,
    },
    link::extract_game_id,
    prelude::*,
};

/// Looks up the results for a list of game links, trying the cache before the fetcher.
///
/// The returned list has the same length and order as `links`. Links which can't be resolved are represented by a
/// [`GameResultError`] in their position. A cache failure only costs a refetch, while a fetch failure is returned as an error.
pub(crate) async fn resolve(cache: &dyn ResultCache, fetcher: &dyn ResultFetcher, links: &[String]) -> Result<Vec<ResolvedResult>, lichess::Error> {
    let game_ids = links.iter().map(|link| extract_game_id(link)).collect_vec();
    let valid_ids = game_ids.iter().filter_map(|id| id.as_ref().ok()).cloned().collect::<HashSet<_>>();
    let mut results = if valid_ids.is_empty() {
        HashMap::default()
    } else {
        match cache.get_all(&valid_ids).await {
            Ok(results) => results,
            Err(e) => {
                log::warn!("failed to read game result cache, fetching all games: {e} ({e:?})");
                HashMap::default()
            }
        }
    };
    let uncached_ids = game_ids.iter()
        .filter_map(|id| id.as_ref().ok())
        .unique()
        .filter(|id| !results.contains_key(*id))
        .cloned()
        .collect_vec();
    if !uncached_ids.is_empty() {
        let fetched = fetcher.fetch_batch(&uncached_ids).await?;
        if let Err(e) = cache.put_all(&fetched, CACHE_TTL).await {
            log::warn!("failed to write {} game results to cache: {e} ({e:?})", fetched.len());
        }
        results.extend(fetched);
    }
    Ok(game_ids.into_iter().map(|id| match id {
        Ok(id) => if let Some(result) = results.get(&id) {
            ResolvedResult::Game(result.clone())
        } else {
            log::warn!("game {id} not found in cached or fetched results");
            ResolvedResult::Error(GameResultError::MissingResult)
        },
        Err(e) => ResolvedResult::Error(e),
    }).collect())
}

#[cfg(test)]
pub(crate) mod tests {
    use {
        std::sync::atomic::{
            AtomicUsize,
            Ordering::SeqCst,
        },
        crate::cache::{
            self,
            MemoryCache,
        },
        super::*,
    };

    /// Serves results from a fixed set of games and records what was requested.
    #[derive(Default)]
    pub(crate) struct FakeFetcher {
        pub(crate) games: HashMap<GameId, GameResult>,
        pub(crate) calls: AtomicUsize,
        pub(crate) requested: std::sync::Mutex<Vec<Vec<GameId>>>,
        pub(crate) fail: bool,
    }

    impl FakeFetcher {
        pub(crate) fn with_games(games: impl IntoIterator<Item = GameResult>) -> Self {
            Self {
                games: games.into_iter().map(|game| (game.game_id().clone(), game)).collect(),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl ResultFetcher for FakeFetcher {
        async fn fetch_batch(&self, ids: &[GameId]) -> Result<HashMap<GameId, GameResult>, lichess::Error> {
            self.calls.fetch_add(1, SeqCst);
            self.requested.lock().unwrap().push(ids.to_vec());
            if self.fail { return Err(lichess::Error::TooManyIds(ids.len())) }
            Ok(ids.iter().filter_map(|id| self.games.get(id).map(|game| (id.clone(), game.clone()))).collect())
        }
    }

    /// A cache whose reads and writes always fail.
    struct BrokenCache;

    #[async_trait]
    impl ResultCache for BrokenCache {
        async fn get_all(&self, _: &HashSet<GameId>) -> Result<HashMap<GameId, GameResult>, cache::Error> {
            Err(cache::Error::TtlRange)
        }

        async fn put_all(&self, _: &HashMap<GameId, GameResult>, _: Duration) -> Result<(), cache::Error> {
            Err(cache::Error::TtlRange)
        }

        async fn remove_all(&self, _: &[GameId]) -> Result<(), cache::Error> {
            Err(cache::Error::TtlRange)
        }

        async fn clear(&self) -> Result<(), cache::Error> {
            Err(cache::Error::TtlRange)
        }
    }

    pub(crate) fn game(id: &str, white: &str, black: &str, outcome: Outcome) -> GameResult {
        GameResult::new(GameId(id.to_owned()), white, black, outcome)
    }

    fn link(id: &str) -> String {
        format!("https://lichess.org/{id}")
    }

    fn id(id: &str) -> GameId {
        GameId(id.to_owned())
    }

    #[tokio::test]
    async fn preserves_length_and_order() {
        let cache = MemoryCache::default();
        let fetcher = FakeFetcher::with_games([
            game("aaaaaaaa", "Alice", "Bob", Outcome::White),
            game("bbbbbbbb", "Bob", "Alice", Outcome::Draw),
        ]);
        let links = vec![
            link("bbbbbbbb"),
            String::new(),
            "https://example.com/aaaaaaaa".to_owned(),
            link("aaaaaaaa/white"),
            link("zzzzzzzz"),
            link("bbbbbbbb"),
        ];
        let results = resolve(&cache, &fetcher, &links).await.unwrap();
        assert_eq!(results, vec![
            ResolvedResult::Game(game("bbbbbbbb", "Bob", "Alice", Outcome::Draw)),
            ResolvedResult::Error(GameResultError::EmptyLink),
            ResolvedResult::Error(GameResultError::InvalidLink),
            ResolvedResult::Game(game("aaaaaaaa", "Alice", "Bob", Outcome::White)),
            ResolvedResult::Error(GameResultError::MissingResult),
            ResolvedResult::Game(game("bbbbbbbb", "Bob", "Alice", Outcome::Draw)),
        ]);
        assert_eq!(fetcher.calls.load(SeqCst), 1);
        assert_eq!(*fetcher.requested.lock().unwrap(), vec![vec![id("bbbbbbbb"), id("aaaaaaaa"), id("zzzzzzzz")]]);
    }

    #[tokio::test]
    async fn skips_fetch_when_everything_is_cached() {
        let cache = MemoryCache::default();
        cache.put_all(&[
            (id("aaaaaaaa"), game("aaaaaaaa", "Alice", "Bob", Outcome::White)),
            (id("bbbbbbbb"), game("bbbbbbbb", "Bob", "Alice", Outcome::Black)),
        ].into_iter().collect(), CACHE_TTL).await.unwrap();
        let fetcher = FakeFetcher::default();
        let results = resolve(&cache, &fetcher, &[link("aaaaaaaa"), link("bbbbbbbb"), String::new(), link("aaaaaaaa")]).await.unwrap();
        assert_eq!(results.len(), 4);
        assert_eq!(results[2], ResolvedResult::Error(GameResultError::EmptyLink));
        assert_eq!(fetcher.calls.load(SeqCst), 0);
    }

    #[tokio::test]
    async fn no_valid_links_means_no_fetch() {
        let fetcher = FakeFetcher::default();
        let results = resolve(&MemoryCache::default(), &fetcher, &[String::new(), "nope".to_owned()]).await.unwrap();
        assert_eq!(results, vec![
            ResolvedResult::Error(GameResultError::EmptyLink),
            ResolvedResult::Error(GameResultError::InvalidLink),
        ]);
        assert_eq!(fetcher.calls.load(SeqCst), 0);
        assert!(resolve(&MemoryCache::default(), &fetcher, &[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn fetches_only_uncached_ids_and_fills_cache() {
        let cache = MemoryCache::default();
        cache.put_all(&[(id("aaaaaaaa"), game("aaaaaaaa", "Alice", "Bob", Outcome::White))].into_iter().collect(), CACHE_TTL).await.unwrap();
        let fetcher = FakeFetcher::with_games([game("bbbbbbbb", "Bob", "Alice", Outcome::Draw)]);
        resolve(&cache, &fetcher, &[link("aaaaaaaa"), link("bbbbbbbb")]).await.unwrap();
        assert_eq!(*fetcher.requested.lock().unwrap(), vec![vec![id("bbbbbbbb")]]);
        let cached = cache.get_all(&[id("aaaaaaaa"), id("bbbbbbbb")].into_iter().collect()).await.unwrap();
        assert_eq!(cached.len(), 2);
        // second run is served entirely from the cache
        resolve(&cache, &fetcher, &[link("aaaaaaaa"), link("bbbbbbbb")]).await.unwrap();
        assert_eq!(fetcher.calls.load(SeqCst), 1);
    }

    #[tokio::test]
    async fn cache_failures_do_not_fail_resolution() {
        let fetcher = FakeFetcher::with_games([game("aaaaaaaa", "Alice", "Bob", Outcome::Black)]);
        let results = resolve(&BrokenCache, &fetcher, &[link("aaaaaaaa")]).await.unwrap();
        assert_eq!(results, vec![ResolvedResult::Game(game("aaaaaaaa", "Alice", "Bob", Outcome::Black))]);
    }

    #[tokio::test]
    async fn fetch_failures_are_fatal() {
        let fetcher = FakeFetcher { fail: true, ..FakeFetcher::default() };
        assert!(resolve(&MemoryCache::default(), &fetcher, &[link("aaaaaaaa")]).await.is_err());
    }
}
