pub mod builders;
pub mod conditions;
pub mod configs;
pub mod crds;
pub mod determiners;
pub mod formatters;
pub mod models;
pub mod params;
pub mod transitions;
