use flatjl_schema::{EnumDef, Namespace, Schema, StructDef};
use log::debug;

use crate::entity::{gen_struct, EntityCode};
use crate::enums::gen_enum;
use crate::error::GenError;
use crate::options::GeneratorOptions;
use crate::output::{Layout, OutputAssembler, OutputSink, TARGET_EXTENSION};

/// Julia generator over one schema.
///
/// Enums are emitted first, then structs and tables, each in declaration
/// order.
pub struct JuliaGenerator<'a> {
    schema:             &'a Schema,
    options:            &'a GeneratorOptions,
    namespace_override: Namespace,
}

impl<'a> JuliaGenerator<'a> {
    pub fn new(schema: &'a Schema, options: &'a GeneratorOptions) -> Result<Self, GenError> {
        Ok(JuliaGenerator {
            schema,
            options,
            namespace_override: options.override_namespace()?,
        })
    }

    pub fn emit_enum(&self, def: &EnumDef) -> EntityCode {
        gen_enum(def)
    }

    pub fn emit_struct(&self, def: &StructDef) -> Result<EntityCode, GenError> {
        gen_struct(self.schema, def, self.options.strict_unions)
    }

    fn layout(&self) -> Layout {
        if self.options.single_file {
            let file = format!(
                "{}{}.{}",
                self.options.file_name, self.options.file_suffix, TARGET_EXTENSION
            );
            Layout::SingleFile {
                path: self.options.output_dir.join(file),
            }
        } else {
            Layout::PerEntity {
                output_dir:         self.options.output_dir.clone(),
                namespace_override: self.namespace_override.clone(),
            }
        }
    }

    /// Emits every entity into `sink`.
    ///
    /// `Ok(false)` means a unit could not be persisted; nothing after it was
    /// attempted. `Err` is reserved for IR the generator cannot handle.
    pub fn generate(&self, sink: &mut dyn OutputSink) -> Result<bool, GenError> {
        let mut assembler = OutputAssembler::new(self.layout(), &self.options.runtime_import, sink);

        for def in &self.schema.enums {
            if !assembler.accept(self.emit_enum(def)) {
                return Ok(false);
            }
        }
        for def in &self.schema.structs {
            if !assembler.accept(self.emit_struct(def)?) {
                return Ok(false);
            }
        }

        debug!(
            "generated {} enums and {} structs",
            self.schema.enums.len(),
            self.schema.structs.len()
        );
        Ok(assembler.finish())
    }
}

/// Convenience wrapper around [`JuliaGenerator::generate`].
pub fn generate_julia(
    schema: &Schema,
    options: &GeneratorOptions,
    sink: &mut dyn OutputSink,
) -> Result<bool, GenError> {
    JuliaGenerator::new(schema, options)?.generate(sink)
}

/// Reads a schema IR serialized as JSON.
pub fn load_schema(json: &str) -> Result<Schema, GenError> {
    Ok(serde_json::from_str(json)?)
}
