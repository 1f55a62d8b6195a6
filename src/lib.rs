pub mod banks;
pub mod config;
pub mod currency;
pub mod dates;
pub mod error;
pub mod fetch;
pub mod gold;
pub mod jobs;
pub mod model;
pub mod postoffice;
pub mod publish;
pub mod rates;
pub mod rbi;
pub mod schemes;
pub mod table;
pub mod taxslabs;
pub mod text;
