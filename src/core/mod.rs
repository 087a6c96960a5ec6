// Module declarations
pub mod error;
pub mod value;
pub mod data_type;
pub mod parameter;
pub mod record;
pub mod row;

// Re-exports for convenience
pub use error::{DataSourceError, ProviderError, ProviderResult, Result};
pub use value::{FromValue, Value};
pub use data_type::{ProviderType, ScalarType};
pub use parameter::{CommandKind, Direction, Parameter, Params};
pub use record::{DataRecord, DetachedRecord};
pub use row::RowView;
