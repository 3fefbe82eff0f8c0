/// Data layer: core types, loading, and cleaning.
///
/// Architecture:
/// ```text
///   titanic.csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → DataFrame
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ DataFrame  │  Vec<Column>, dtype inference
///   └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  clean    │  fill Age / Embarked, drop Cabin
///   └──────────┘
/// ```

pub mod clean;
pub mod loader;
pub mod model;
