pub mod alertparser;
pub mod timefmt;
