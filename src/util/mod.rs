pub mod time_ago;
