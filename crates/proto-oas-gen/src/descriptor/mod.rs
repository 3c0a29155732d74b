pub mod kinds;
pub mod options;
pub mod pool;
pub mod raw;


pub use kinds::{Cardinality, FieldKind};
pub use options::{FieldBehavior, FieldFormat, FieldOptions, RawCustomPattern, RawHttpRule};
pub use pool::{
  Comments, DescriptorPool, EnumDescriptor, EnumValue, FieldDescriptor, FileDescriptor, MessageDescriptor,
  MethodDescriptor, ServiceDescriptor,
};
