pub mod newsapi;
