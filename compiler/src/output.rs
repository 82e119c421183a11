//! Turning entity blocks into persisted units.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use flatjl_schema::Namespace;
use log::{error, info};

use crate::entity::EntityCode;
use crate::namespace::Import;

/// First line of every generated unit.
pub const GENERATED_HEADER: &str = "# Code generated by flatjl. DO NOT EDIT.";

pub const TARGET_EXTENSION: &str = "jl";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputUnit {
    pub path:     PathBuf,
    pub contents: String,
}

/// Where finished units go.
pub trait OutputSink {
    fn persist(&mut self, unit: OutputUnit) -> io::Result<()>;
}

/// Writes units to disk, creating directories as needed.
#[derive(Debug, Default)]
pub struct FileSink;

impl OutputSink for FileSink {
    fn persist(&mut self, unit: OutputUnit) -> io::Result<()> {
        if let Some(parent) = unit.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&unit.path, unit.contents)
    }
}

/// Keeps units in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub units: Vec<OutputUnit>,
}

impl OutputSink for MemorySink {
    fn persist(&mut self, unit: OutputUnit) -> io::Result<()> {
        self.units.push(unit);
        Ok(())
    }
}

/// Header, runtime import and imports that open every unit.
pub fn begin_file(runtime_import: &str, imports: &[Import]) -> String {
    let mut code = format!("{}\n\n{}\n\n", GENERATED_HEADER, runtime_import);
    if !imports.is_empty() {
        for import in imports {
            code.push_str(&import.render());
            code.push('\n');
        }
        code.push('\n');
    }
    code
}

/// Collapses a run of trailing newlines to a single one.
pub fn strip_trailing_blank_lines(code: &mut String) {
    while code.ends_with("\n\n") {
        code.pop();
    }
}

/// `<dir>/<A>/<B>/` for namespace `A.B`.
pub fn namespace_dir(dir: &Path, ns: &Namespace) -> PathBuf {
    let mut path = dir.to_path_buf();
    for component in &ns.components {
        path.push(component);
    }
    path
}

/// How entity blocks become units.
pub enum Layout {
    /// One unit per entity under its namespace's directory.
    PerEntity {
        output_dir:         PathBuf,
        namespace_override: Namespace,
    },
    /// All entities behind one header in a single unit.
    SingleFile { path: PathBuf },
}

pub struct OutputAssembler<'s> {
    layout:         Layout,
    runtime_import: String,
    sink:           &'s mut dyn OutputSink,
    buffered:       Vec<EntityCode>,
}

impl<'s> OutputAssembler<'s> {
    pub fn new(layout: Layout, runtime_import: &str, sink: &'s mut dyn OutputSink) -> Self {
        OutputAssembler {
            layout,
            runtime_import: runtime_import.to_string(),
            sink,
            buffered: Vec::new(),
        }
    }

    fn persist(&mut self, path: PathBuf, contents: String) -> bool {
        let display = path.display().to_string();
        match self.sink.persist(OutputUnit { path, contents }) {
            Ok(()) => {
                info!("wrote {}", display);
                true
            }
            Err(e) => {
                error!("failed to write {}: {}", display, e);
                false
            }
        }
    }

    /// Takes one entity's block. In per-entity mode it is persisted right away
    /// and the result is whether that succeeded; empty blocks are skipped.
    pub fn accept(&mut self, entity: EntityCode) -> bool {
        if entity.is_empty() {
            return true;
        }
        match &self.layout {
            Layout::PerEntity { output_dir, namespace_override } => {
                let ns = if namespace_override.is_root() {
                    &entity.namespace
                } else {
                    namespace_override
                };
                let path = namespace_dir(output_dir, ns)
                    .join(format!("{}.{}", entity.name, TARGET_EXTENSION));
                let mut code = begin_file(&self.runtime_import, &entity.imports);
                code.push_str(&entity.code);
                strip_trailing_blank_lines(&mut code);
                self.persist(path, code)
            }
            Layout::SingleFile { .. } => {
                self.buffered.push(entity);
                true
            }
        }
    }

    /// Persists the combined unit in single-file mode. Returns the overall
    /// outcome of this final step.
    pub fn finish(mut self) -> bool {
        let path = match &self.layout {
            Layout::PerEntity { .. } => return true,
            Layout::SingleFile { path } => path.clone(),
        };
        let mut imports: Vec<Import> = self
            .buffered
            .iter()
            .flat_map(|e| e.imports.iter().cloned())
            .collect();
        imports.sort();
        imports.dedup();

        let mut code = begin_file(&self.runtime_import, &imports);
        for entity in &self.buffered {
            code.push_str(&entity.code);
        }
        strip_trailing_blank_lines(&mut code);
        self.persist(path, code)
    }
}

#[test]
fn trailing_blank_lines_collapse() {
    let mut code = "end\n\n\n\n".to_string();
    strip_trailing_blank_lines(&mut code);
    assert_eq!(code, "end\n");

    let mut code = "end\n".to_string();
    strip_trailing_blank_lines(&mut code);
    assert_eq!(code, "end\n");
}

#[test]
fn header_lists_imports() {
    let imports = vec![Import { name: "A__B".into(), path: "A/B".into() }];
    assert_eq!(
        begin_file("using FlatBuffers", &imports),
        "# Code generated by flatjl. DO NOT EDIT.\n\nusing FlatBuffers\n\nimport ..A__B  # A/B\n\n"
    );
    assert_eq!(
        begin_file("using FlatBuffers", &[]),
        "# Code generated by flatjl. DO NOT EDIT.\n\nusing FlatBuffers\n\n"
    );
}
