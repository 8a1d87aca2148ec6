//! Semantics-preserving AST transformers: CTE management, renames,
//! value rewriting, write-to-SELECT simulation, and the JSON
//! object-graph builder.

mod convert;
mod cte;
mod error;
mod json_cte;
mod rename;
mod rewrite;
mod simulate;

pub use convert::{
    DeleteConversionOptions, InsertConversionOptions, MergeConversionOptions,
    UpdateConversionOptions,
};
pub use cte::CteOptions;
pub use error::TransformError;
pub use json_cte::{
    JsonChild, JsonColumnMapping, JsonEntity, JsonMapping, JsonRelation, ObjectGraphCteBuilder,
};
pub use rename::{rename_cte, rename_cte_at_position, smart_rename, SmartRenameOptions};
pub use rewrite::{rewrite_query, rewrite_value, ValueRewriter};
pub use simulate::{
    delete_to_select, insert_to_select, merge_to_select, update_to_select, FixtureTable,
    MissingFixtureStrategy, SimulationOptions, TableColumnDefinition, TableDefinition,
    TableDefinitionResolver,
};
