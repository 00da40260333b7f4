pub mod arcade;
pub mod leaderboard;
pub mod mining;
pub mod wallet;
