//! Tool command specifications and argument placeholders.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::options::BuildOptions;
use crate::tools::names;

/// A `[tools.<name>]` table from a config file.
///
/// Every field is optional so a project file can override a single field
/// of a global or built-in definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSpec {
    /// Executable name or path
    pub command: Option<String>,

    /// Arguments, with placeholders
    pub args: Option<Vec<String>>,

    /// Extra environment variables
    pub env: BTreeMap<String, String>,

    /// Set to `false` to bypass the tool
    pub enabled: Option<bool>,
}

impl ToolSpec {
    /// Merge another spec into this one (other takes precedence).
    pub fn merge(&mut self, other: ToolSpec) {
        if other.command.is_some() {
            self.command = other.command;
        }
        if other.args.is_some() {
            self.args = other.args;
        }
        self.env.extend(other.env);
        if other.enabled.is_some() {
            self.enabled = other.enabled;
        }
    }
}

/// A fully resolved tool definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTool {
    /// Tool name (e.g. `sass`)
    pub name: String,
    /// Executable name or path
    pub command: String,
    /// Arguments, with placeholders
    pub args: Vec<String>,
    /// Extra environment variables
    pub env: BTreeMap<String, String>,
    /// Whether the tool runs at all
    pub enabled: bool,
}

impl ResolvedTool {
    /// Resolve a tool: built-in default, then the override on top.
    pub fn resolve(name: &str, spec: Option<&ToolSpec>) -> Option<ResolvedTool> {
        let mut tool = default_tool(name);

        if let Some(spec) = spec {
            let mut resolved = tool.unwrap_or_else(|| ResolvedTool {
                name: name.to_string(),
                command: name.to_string(),
                args: Vec::new(),
                env: BTreeMap::new(),
                enabled: true,
            });
            if let Some(ref command) = spec.command {
                resolved.command = command.clone();
            }
            if let Some(ref args) = spec.args {
                resolved.args = args.clone();
            }
            resolved
                .env
                .extend(spec.env.iter().map(|(k, v)| (k.clone(), v.clone())));
            if let Some(enabled) = spec.enabled {
                resolved.enabled = enabled;
            }
            tool = Some(resolved);
        }

        tool
    }
}

/// Browser matrix handed to the vendor-prefixing tool.
pub const PREFIX_BROWSERS: &str = "last 2 versions, ie >= 9, and_chr >= 2.3";

fn tool(name: &str, command: &str, args: &[&str]) -> ResolvedTool {
    ResolvedTool {
        name: name.to_string(),
        command: command.to_string(),
        args: args.iter().map(|s| s.to_string()).collect(),
        env: BTreeMap::new(),
        enabled: true,
    }
}

/// Built-in definition of a known tool.
pub fn default_tool(name: &str) -> Option<ResolvedTool> {
    let resolved = match name {
        names::SASS => tool(
            name,
            "sass",
            &["--stdin", "--style=expanded", "--load-path=."],
        ),
        names::AUTOPREFIXER => {
            let mut t = tool(name, "postcss", &["--use", "autoprefixer", "--no-map"]);
            t.env
                .insert("BROWSERSLIST".to_string(), PREFIX_BROWSERS.to_string());
            t
        }
        // cssnano's default preset only performs transforms that keep selector semantics.
        names::CSSNANO => tool(name, "postcss", &["--use", "cssnano", "--no-map"]),
        names::BABEL => tool(
            name,
            "babel",
            &[
                "--presets",
                "@babel/preset-env",
                "--plugins",
                "@babel/plugin-transform-modules-umd",
                "--filename",
                "{file}",
            ],
        ),
        names::UGLIFY => tool(
            name,
            "uglifyjs",
            &["--compress", "drop_debugger={strip_debug}"],
        ),
        names::IMAGEMIN => tool(name, "imagemin", &[]),
        names::FAVICONS => tool(
            name,
            "favicons",
            &["--config", "{options}", "--output", "{output_dir}", "{files}"],
        ),
        names::SVG_SPRITE => tool(
            name,
            "svg-sprite",
            &[
                "--symbol",
                "--symbol-dest=.",
                "--symbol-sprite=icons/icons-store.svg",
                "--shape-id-separator=-",
                "--svg-xmldecl=false",
                "--svg-doctype=false",
                "--svg-dimensions=false",
                "--dest={output_dir}",
                "{files}",
            ],
        ),
        names::ESLINT => tool(name, "eslint", &["{files}"]),
        names::SASS_LINT => tool(
            name,
            "sass-lint",
            &["--verbose", "--max-warnings", "0", "{files}"],
        ),
        _ => return None,
    };
    Some(resolved)
}

/// Values substituted into tool arguments.
///
/// `{key}` anywhere in an argument is replaced by its value; an argument
/// that is exactly `{files}` expands to one argument per file. Unknown
/// placeholders are left as written.
#[derive(Debug, Clone, Default)]
pub struct ToolVars {
    values: BTreeMap<&'static str, String>,
    files: Vec<String>,
}

impl ToolVars {
    /// Variables derived from the build options.
    pub fn new(opts: &BuildOptions) -> Self {
        ToolVars::default()
            .with("strip_debug", opts.strip_js_debug.to_string())
            .with("online", opts.real_favicon_api.to_string())
            .with("production", opts.is_production().to_string())
    }

    /// Set a single value.
    pub fn with(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.values.insert(key, value.into());
        self
    }

    /// Set the `{files}` list.
    pub fn with_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files = files.into_iter().map(Into::into).collect();
        self
    }

    /// Look up a value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Expand placeholders in an argument list.
    pub fn expand(&self, args: &[String]) -> Vec<String> {
        let mut out = Vec::with_capacity(args.len());
        for arg in args {
            if arg == "{files}" {
                out.extend(self.files.iter().cloned());
                continue;
            }
            out.push(self.expand_one(arg));
        }
        out
    }

    /// Substitute every `{key}` in `arg` in one left-to-right pass.
    /// Substituted values are never scanned again.
    fn expand_one(&self, arg: &str) -> String {
        let mut expanded = String::with_capacity(arg.len());
        let mut rest = arg;
        while let Some(open) = rest.find('{') {
            expanded.push_str(&rest[..open]);
            let tail = &rest[open..];
            let value = tail
                .find('}')
                .and_then(|close| self.get(&tail[1..close]).map(|v| (v, close)));
            match value {
                Some((value, close)) => {
                    expanded.push_str(value);
                    rest = &tail[close + 1..];
                }
                None => {
                    expanded.push('{');
                    rest = &tail[1..];
                }
            }
        }
        expanded.push_str(rest);
        expanded
    }
}
