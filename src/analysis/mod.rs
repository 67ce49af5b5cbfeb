//! # Analysis Stages
//!
//! Six independent questions answered from the same two relations:
//!
//! - [`favorite_genre`] - each user's most played genre
//! - [`listen_time`] - average listen duration per song
//! - [`weekly_top`] - most played songs in the latest week with activity
//! - [`recommendations`] - happy songs for listeners who mostly play sad ones
//! - [`loyalty`] - share of a user's plays in their top genre
//! - [`night_owls`] - users with plays between midnight and early morning
//!
//! Stages only read the inputs; none consumes another stage's output. The
//! join of events against songs is computed once in [`AnalysisInput`] and
//! shared by every stage that needs metadata.

pub mod favorite_genre;
pub mod listen_time;
pub mod loyalty;
pub mod night_owls;
pub mod recommendations;
pub mod weekly_top;

use crate::config::AnalysisConfig;
use crate::relational::inner_join;
use crate::schema::{JoinedEvent, ListeningEvent, Song};
use clap::ValueEnum;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

pub use favorite_genre::FavoriteGenre;
pub use listen_time::SongListenTime;
pub use loyalty::LoyaltyScore;
pub use night_owls::NightOwl;
pub use recommendations::Recommendation;
pub use weekly_top::WeeklyTopSong;

/// One of the six analyses.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Task {
    /// Each user's most played genre
    FavoriteGenre,
    /// Average listen duration per song
    AvgListenTime,
    /// Top songs of the most recent week with plays
    TopSongsThisWeek,
    /// Happy songs for mostly-sad listeners
    HappyRecommendations,
    /// Users concentrated on a single genre
    GenreLoyalty,
    /// Users with late-night plays
    NightOwls,
}

impl Task {
    /// Every task, in report order.
    pub const ALL: [Task; 6] = [
        Task::FavoriteGenre,
        Task::AvgListenTime,
        Task::TopSongsThisWeek,
        Task::HappyRecommendations,
        Task::GenreLoyalty,
        Task::NightOwls,
    ];

    /// Base name of the task's output table.
    #[must_use]
    pub const fn output_name(self) -> &'static str {
        match self {
            Task::FavoriteGenre => "user_favorite_genres",
            Task::AvgListenTime => "avg_listen_time_per_song",
            Task::TopSongsThisWeek => "top_songs_this_week",
            Task::HappyRecommendations => "happy_recommendations",
            Task::GenreLoyalty => "genre_loyalty_scores",
            Task::NightOwls => "night_owl_users",
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.output_name())
    }
}

/// Result rows of one stage.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutput {
    FavoriteGenre(Vec<FavoriteGenre>),
    AvgListenTime(Vec<SongListenTime>),
    TopSongsThisWeek(Vec<WeeklyTopSong>),
    HappyRecommendations(Vec<Recommendation>),
    GenreLoyalty(Vec<LoyaltyScore>),
    NightOwls(Vec<NightOwl>),
}

impl TaskOutput {
    #[must_use]
    pub fn task(&self) -> Task {
        match self {
            Self::FavoriteGenre(_) => Task::FavoriteGenre,
            Self::AvgListenTime(_) => Task::AvgListenTime,
            Self::TopSongsThisWeek(_) => Task::TopSongsThisWeek,
            Self::HappyRecommendations(_) => Task::HappyRecommendations,
            Self::GenreLoyalty(_) => Task::GenreLoyalty,
            Self::NightOwls(_) => Task::NightOwls,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::FavoriteGenre(rows) => rows.len(),
            Self::AvgListenTime(rows) => rows.len(),
            Self::TopSongsThisWeek(rows) => rows.len(),
            Self::HappyRecommendations(rows) => rows.len(),
            Self::GenreLoyalty(rows) => rows.len(),
            Self::NightOwls(rows) => rows.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The two input relations plus their shared inner join.
#[derive(Debug)]
pub struct AnalysisInput<'a> {
    pub events: &'a [ListeningEvent],
    pub songs: &'a [Song],
    pub joined: Vec<JoinedEvent<'a>>,
}

impl<'a> AnalysisInput<'a> {
    #[must_use]
    pub fn new(events: &'a [ListeningEvent], songs: &'a [Song]) -> Self {
        Self {
            events,
            songs,
            joined: join_events(events, songs),
        }
    }
}

/// Inner join of events with song metadata on `song_id`.
///
/// Events referencing unknown songs are dropped; the number dropped is
/// logged.
#[must_use]
pub fn join_events<'a>(events: &'a [ListeningEvent], songs: &'a [Song]) -> Vec<JoinedEvent<'a>> {
    let joined = inner_join(
        events,
        songs,
        |event| event.song_id.as_str(),
        |song| song.song_id.as_str(),
        |event, song| JoinedEvent { event, song },
    );

    let known: HashSet<&str> = songs.iter().map(|song| song.song_id.as_str()).collect();
    let unmatched = events
        .iter()
        .filter(|event| !known.contains(event.song_id.as_str()))
        .count();
    if unmatched > 0 {
        warn!("{unmatched} listening events reference unknown songs and are excluded from joined analyses");
    }
    debug!("Joined {} events against {} songs into {} rows", events.len(), songs.len(), joined.len());

    joined
}

/// Run one stage against the shared input.
#[must_use]
pub fn run_task(task: Task, input: &AnalysisInput<'_>, config: &AnalysisConfig) -> TaskOutput {
    match task {
        Task::FavoriteGenre => TaskOutput::FavoriteGenre(favorite_genre::favorite_genres(&input.joined)),
        Task::AvgListenTime => TaskOutput::AvgListenTime(listen_time::average_listen_time(input.events)),
        Task::TopSongsThisWeek => TaskOutput::TopSongsThisWeek(weekly_top::top_songs_this_week(
            input.events,
            input.songs,
            config.top_songs_limit,
        )),
        Task::HappyRecommendations => {
            TaskOutput::HappyRecommendations(recommendations::happy_recommendations(input, config))
        }
        Task::GenreLoyalty => TaskOutput::GenreLoyalty(loyalty::genre_loyalty_scores(
            &input.joined,
            config.loyalty_threshold,
        )),
        Task::NightOwls => TaskOutput::NightOwls(night_owls::night_owl_users(
            input.events,
            config.night_start_hour..config.night_end_hour,
        )),
    }
}

/// `numerator / denominator`, or `None` when there is nothing to divide by.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn ratio(numerator: u64, denominator: u64) -> Option<f64> {
    (denominator > 0).then(|| numerator as f64 / denominator as f64)
}
