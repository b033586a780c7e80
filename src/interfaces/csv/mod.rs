pub mod spending_reader;
