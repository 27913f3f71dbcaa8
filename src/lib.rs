pub mod analyzers;
pub mod charts;
pub mod observation;
pub mod output;
pub mod parser;
