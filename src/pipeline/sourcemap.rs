//! Line-level Source Map v3 support.
//!
//! Maps are tracked one entry per generated line. Concatenation keeps
//! them exact; a tool that changes the number of lines in a file
//! degrades the map to file level (every line points at the start of
//! the first source).

use oxc_sourcemap::SourceMapBuilder;
use serde_json::Value;

/// Where a generated line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineOrigin {
    /// Index into `sources`
    pub source: usize,
    /// Zero-based line in that source
    pub line: usize,
}

/// A source map under construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMap {
    sources: Vec<String>,
    sources_content: Vec<Option<String>>,
    lines: Vec<Option<LineOrigin>>,
}

/// Number of lines in `text`, counting the (possibly empty) tail after
/// the last newline.
pub fn line_count(text: &str) -> usize {
    text.split('\n').count()
}

impl SourceMap {
    /// A map where every line of `content` maps to itself.
    pub fn identity(source: impl Into<String>, content: &str) -> Self {
        let lines = (0..line_count(content))
            .map(|line| Some(LineOrigin { source: 0, line }))
            .collect();
        SourceMap {
            sources: vec![source.into()],
            sources_content: vec![Some(content.to_string())],
            lines,
        }
    }

    /// Sources referenced by this map.
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// Per-line origins.
    pub fn lines(&self) -> &[Option<LineOrigin>] {
        &self.lines
    }

    /// Concatenate maps in order, as for contents joined with `\n`.
    ///
    /// A part without a map contributes unmapped lines.
    pub fn concat<'a, I>(parts: I) -> Self
    where
        I: IntoIterator<Item = (Option<&'a SourceMap>, usize)>,
    {
        let mut out = SourceMap {
            sources: Vec::new(),
            sources_content: Vec::new(),
            lines: Vec::new(),
        };

        for (map, count) in parts {
            let Some(map) = map else {
                out.lines.extend(std::iter::repeat(None).take(count));
                continue;
            };

            let offset = out.sources.len();
            out.sources.extend(map.sources.iter().cloned());
            out.sources_content
                .extend(map.sources_content.iter().cloned());
            out.lines.extend(map.lines.iter().map(|origin| {
                origin.map(|o| LineOrigin {
                    source: o.source + offset,
                    line: o.line,
                })
            }));
        }

        out
    }

    /// Follow a transformation that produced `new_line_count` lines.
    ///
    /// Line-preserving transforms keep the map as is.
    pub fn transformed(&self, new_line_count: usize) -> Self {
        if new_line_count == self.lines.len() {
            return self.clone();
        }

        let first = self.lines.iter().flatten().next().map(|o| LineOrigin {
            source: o.source,
            line: 0,
        });
        SourceMap {
            sources: self.sources.clone(),
            sources_content: self.sources_content.clone(),
            lines: vec![first; new_line_count],
        }
    }

    /// Serialize as Source Map v3 JSON.
    ///
    /// Every mapped line gets one segment at column 0.
    pub fn to_json(&self, file: &str, source_root: &str) -> Result<String, serde_json::Error> {
        let mut builder = SourceMapBuilder::default();
        builder.set_file(file);

        let ids: Vec<u32> = self
            .sources
            .iter()
            .zip(&self.sources_content)
            .map(|(source, content)| {
                builder.add_source_and_content(source, content.as_deref().unwrap_or_default())
            })
            .collect();

        for (line, origin) in self.lines.iter().enumerate() {
            let Some(origin) = origin else { continue };
            let Some(&id) = ids.get(origin.source) else { continue };
            builder.add_token(line as u32, 0, origin.line as u32, 0, Some(id), None);
        }

        let mut json: Value = serde_json::from_str(&builder.into_sourcemap().to_json_string())?;
        if let Some(map) = json.as_object_mut() {
            map.insert("sourceRoot".to_string(), Value::from(source_root));
        }
        serde_json::to_string_pretty(&json)
    }
}

/// Comment linking an artifact to its map.
pub fn mapping_url_comment(extension: &str, map_file: &str) -> String {
    match extension {
        "css" => format!("\n/*# sourceMappingURL={} */\n", map_file),
        _ => format!("\n//# sourceMappingURL={}\n", map_file),
    }
}
