pub(crate) use {
    std::{
        collections::{
            HashMap,
            HashSet,
        },
        io,
        path::{
            Path,
            PathBuf,
        },
        str::FromStr,
        time::Duration,
    },
    async_trait::async_trait,
    chrono::{
        DateTime,
        Utc,
    },
    derive_more::{
        Display,
        From,
    },
    enum_iterator::{
        Sequence,
        all,
    },
    itertools::Itertools as _,
    lazy_regex::{
        regex_captures,
        regex_is_match,
    },
    serde::{
        Deserialize,
        Serialize,
    },
    tokio::{
        sync::Mutex,
        time::Instant,
    },
    wheel::{
        fs,
        traits::{
            IoResultExt as _,
            IsNetworkError,
            ReqwestResponseExt as _,
        },
    },
    crate::{
        cache::{
            CACHE_TTL,
            ResultCache,
        },
        config::Config,
        game_result::{
            GameId,
            GameResult,
            GameResultError,
            Outcome,
            ResolvedResult,
        },
    },
};
