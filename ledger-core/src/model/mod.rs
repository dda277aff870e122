pub mod change_log;
pub mod change_op;
pub mod embedding;
pub mod event;
pub mod field;
pub mod integrity_log;
pub mod timeseries;

pub use change_log::ChangeLogRecord;
pub use change_op::ChangeOp;
pub use embedding::{bytes_to_vector, vector_to_bytes, EmbeddingRecord};
pub use event::{EntityChangeEvent, PropertyChange};
pub use field::{EmbeddableSpec, FieldDescriptor, TableDescriptor};
pub use integrity_log::IntegrityLogRecord;
pub use timeseries::{InterpolationMethod, TimeseriesBase, TimeseriesDelta, TimeseriesSample};
