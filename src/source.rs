//! Recover the `go install` source of a binary from its symbol table.
//!
//! `go tool objdump -s main.main <bin>` starts with a header such as
//!
//! ```text
//! TEXT main.main(SB) /home/u/go/pkg/mod/github.com/foo/bar@v1.2.3/cmd/tool1/main.go
//! ```
//!
//! For a binary built by `go install <pkg>@<version>` the file column points
//! into the module cache, which is enough to rebuild the package import path.

use crate::error::{Result, UpdateError};
use crate::toolchain::{Toolchain, GOMODCACHE};
use regex::Regex;
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

/// Where a binary's `main` package came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSource {
    /// Module path, e.g. `github.com/foo/bar`.
    pub module: String,
    /// Module version the binary was built from, e.g. `v1.2.3`.
    pub version: String,
    /// Package directory inside the module, e.g. `cmd/tool1`.
    pub package: String,
}

impl ModuleSource {
    /// Import path of the `main` package: `<module>/<package>`.
    pub fn import_path(&self) -> String {
        format!("{}/{}", self.module, self.package)
    }

    /// Argument for `go install`.
    pub fn install_target(&self) -> String {
        format!("{}@latest", self.import_path())
    }
}

impl fmt::Display for ModuleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.import_path())
    }
}

/// Disassemble `main.main` of `binary` and work out which package it was
/// installed from.
pub fn resolve_source(toolchain: &dyn Toolchain, binary: &Path) -> Result<ModuleSource> {
    let output = toolchain.objdump_main(binary)?;
    let line = first_line(&output);
    tracing::debug!("{}: {}", binary.display(), line);

    if !line.contains('@') {
        return Err(UpdateError::UnknownProvenance {
            binary: binary.to_path_buf(),
        });
    }

    let module_cache = toolchain.env(GOMODCACHE);
    if module_cache.is_empty() {
        return Err(UpdateError::ConfigMissing {
            name: GOMODCACHE.to_string(),
        });
    }

    let source = parse_symbol_line(line, &module_cache)?;
    tracing::info!(
        "{} was installed from {} {}",
        binary.display(),
        source,
        source.version
    );
    Ok(source)
}

/// Parse one objdump line whose source path lies under `module_cache`.
///
/// Both `/` and `\` are accepted as separators; the result always uses `/`.
pub fn parse_symbol_line(line: &str, module_cache: &str) -> Result<ModuleSource> {
    let field = source_field(line).ok_or_else(|| UpdateError::MalformedSymbolPath {
        path: line.to_string(),
        reason: "no field carries a module version".to_string(),
    })?;

    let relative = strip_module_cache(field, module_cache)?;
    split_source_path(relative)
}

fn first_line(output: &str) -> &str {
    output.trim().lines().next().unwrap_or("").trim()
}

/// The file column. In the `TEXT <symbol> <file>` header the file is the rest
/// of the line and may contain spaces; line-table rows put the file first, so
/// otherwise the first field carrying a version tag is used.
fn source_field(line: &str) -> Option<&str> {
    if let Some(caps) = text_header_regex().captures(line) {
        let file = caps.name("file")?.as_str().trim();
        if file.contains('@') {
            return Some(file);
        }
    }
    line.split_whitespace().find(|f| f.contains('@'))
}

fn text_header_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^TEXT\s+\S+\s+(?P<file>.+)$").expect("TEXT header pattern is valid")
    })
}

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

fn strip_module_cache<'a>(path: &'a str, module_cache: &str) -> Result<&'a str> {
    let not_inside = || UpdateError::NotInModuleCache {
        path: path.to_string(),
        cache: module_cache.to_string(),
    };

    let cache = module_cache.trim_end_matches(is_separator);
    let rest = path.strip_prefix(cache).ok_or_else(not_inside)?;
    let mut chars = rest.chars();
    match chars.next() {
        Some(c) if is_separator(c) => Ok(chars.as_str()),
        _ => Err(not_inside()),
    }
}

fn source_path_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(?P<module>[^@]+)@(?P<version>[^/\\]+)[/\\](?P<package>.+)[/\\](?P<file>[^/\\]+)$",
        )
        .expect("source path pattern is valid")
    })
}

/// Split `<module>@<version>/<package>/<file>` (relative to the module cache).
fn split_source_path(relative: &str) -> Result<ModuleSource> {
    let malformed = |reason: String| UpdateError::MalformedSymbolPath {
        path: relative.to_string(),
        reason,
    };

    let caps = match source_path_regex().captures(relative) {
        Some(caps) => caps,
        None => {
            let reason = match relative.split_once('@') {
                None => "missing '@<version>'".to_string(),
                Some(("", _)) => "empty module path".to_string(),
                Some((_, tail)) if tail.chars().filter(|&c| is_separator(c)).count() < 2 => {
                    format!("'{}' has no package directory between version and file", tail)
                }
                Some(_) => "expected <module>@<version>/<package>/<file>".to_string(),
            };
            return Err(malformed(reason));
        }
    };

    let module = normalize_separators(&caps["module"]);
    let package = normalize_separators(&caps["package"]);
    tracing::trace!("Dropping file segment '{}'", &caps["file"]);

    let module = unescape_case(&module)
        .ok_or_else(|| malformed(format!("invalid case escape in module '{}'", module)))?;
    let version = unescape_case(&caps["version"]).ok_or_else(|| {
        malformed(format!("invalid case escape in version '{}'", &caps["version"]))
    })?;

    Ok(ModuleSource {
        module,
        version,
        package,
    })
}

fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}

/// Undo the module cache's case encoding, where `!x` stands for `X`.
fn unescape_case(escaped: &str) -> Option<String> {
    let mut out = String::with_capacity(escaped.len());
    let mut chars = escaped.chars();
    while let Some(c) = chars.next() {
        if c == '!' {
            match chars.next() {
                Some(next) if next.is_ascii_lowercase() => out.push(next.to_ascii_uppercase()),
                _ => return None,
            }
        } else {
            out.push(c);
        }
    }
    Some(out)
}
