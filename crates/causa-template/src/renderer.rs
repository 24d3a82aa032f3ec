//! Two-pass rendering over value trees
//!
//! Pass 1 walks the value and collects every `(fetcher, args)` pair
//! referenced by a template object. The barrier then resolves all
//! distinct pairs concurrently. Pass 2 walks a deep clone and replaces
//! each template object with its evaluated format string, reading
//! resolved values from the cache populated at the barrier.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::task::JoinSet;

use crate::error::{Error, Result};
use crate::expr::Expr;
use crate::fetcher::FetcherSet;
use crate::format::{FormatString, Part};
use crate::object::{self, DEFAULT_MARKER};

/// Key identifying one distinct fetcher invocation.
///
/// Arguments are compared structurally via their canonical JSON form.
type CallKey = (String, String);

/// Resolved fetcher results, populated at the barrier.
type ResolvedCache = HashMap<CallKey, Option<Value>>;

/// Renders template objects embedded in configuration value trees.
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    marker: String,
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer {
    /// Create a renderer using the default `$format` marker.
    pub fn new() -> Self {
        Self::with_marker(DEFAULT_MARKER)
    }

    /// Create a renderer with a custom template marker.
    pub fn with_marker(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    /// The template marker key this renderer recognizes.
    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Whether rendering `value` would alter it.
    pub fn contains_template(&self, value: &Value) -> bool {
        object::contains_template(&self.marker, value)
    }

    /// Render every template object under `value`.
    ///
    /// Returns a deep clone with template objects replaced by their
    /// rendered strings. A template whose expression evaluates to an
    /// undefined value is left intact, which makes rendering idempotent
    /// at that boundary. Fetcher errors propagate unchanged.
    pub async fn render(&self, value: &Value, fetchers: &FetcherSet) -> Result<Value> {
        let mut templates: HashMap<String, FormatString> = HashMap::new();
        let mut calls: HashMap<CallKey, (String, Vec<Value>)> = HashMap::new();

        self.discover(value, fetchers, &mut templates, &mut calls)?;
        let cache = resolve_calls(calls, fetchers).await?;
        self.substitute(value, &templates, &cache)
    }

    /// Pass 1: parse format strings and record fetcher invocations.
    fn discover(
        &self,
        value: &Value,
        fetchers: &FetcherSet,
        templates: &mut HashMap<String, FormatString>,
        calls: &mut HashMap<CallKey, (String, Vec<Value>)>,
    ) -> Result<()> {
        if let Some(format_value) = object::template_format(&self.marker, value) {
            let raw = format_value.as_str().ok_or_else(|| {
                Error::rendering(
                    format_value.to_string(),
                    format!("the value of '{}' must be a string", self.marker),
                )
            })?;

            if !templates.contains_key(raw) {
                let parsed =
                    FormatString::parse(raw).map_err(|reason| Error::rendering(raw, reason))?;
                templates.insert(raw.to_string(), parsed);
            }

            let mut sites: Vec<(&str, &[Value])> = Vec::new();
            for part in templates[raw].parts() {
                if let Part::Expr(expr) = part {
                    expr.for_each_call(&mut |name, args| sites.push((name, args)));
                }
            }
            for (name, args) in sites {
                if !fetchers.contains(name) {
                    return Err(Error::rendering(raw, format!("unknown fetcher '{name}'")));
                }
                calls.insert(call_key(name, args), (name.to_string(), args.to_vec()));
            }
            // Template objects are leaves; their interior is the format
            // string, not configuration data.
            return Ok(());
        }

        match value {
            Value::Object(map) => {
                for child in map.values() {
                    self.discover(child, fetchers, templates, calls)?;
                }
            }
            Value::Array(items) => {
                for item in items {
                    self.discover(item, fetchers, templates, calls)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Pass 2: rebuild the tree, replacing template objects.
    fn substitute(
        &self,
        value: &Value,
        templates: &HashMap<String, FormatString>,
        cache: &ResolvedCache,
    ) -> Result<Value> {
        if let Some(format_value) = object::template_format(&self.marker, value) {
            let raw = format_value.as_str().ok_or_else(|| {
                Error::rendering(
                    format_value.to_string(),
                    format!("the value of '{}' must be a string", self.marker),
                )
            })?;
            let format = templates
                .get(raw)
                .ok_or_else(|| Error::rendering(raw, "template missing from discovery pass"))?;

            return match self.eval_format(format, cache)? {
                Some(text) => Ok(Value::String(text)),
                None => Ok(value.clone()),
            };
        }

        match value {
            Value::Object(map) => {
                let mut out = serde_json::Map::with_capacity(map.len());
                for (key, child) in map {
                    out.insert(key.clone(), self.substitute(child, templates, cache)?);
                }
                Ok(Value::Object(out))
            }
            Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(self.substitute(item, templates, cache)?);
                }
                Ok(Value::Array(out))
            }
            scalar => Ok(scalar.clone()),
        }
    }

    /// Evaluate a format string against resolved fetcher results.
    ///
    /// `None` means some interpolated value was undefined and the whole
    /// template must be left intact.
    fn eval_format(&self, format: &FormatString, cache: &ResolvedCache) -> Result<Option<String>> {
        let mut out = String::new();
        for part in format.parts() {
            match part {
                Part::Literal(text) => out.push_str(text),
                Part::Expr(expr) => match eval_expr(expr, cache)? {
                    Some(value) => out.push_str(&stringify(&value)),
                    None => return Ok(None),
                },
            }
        }
        Ok(Some(out))
    }
}

/// Evaluate one expression against the resolved-data cache.
fn eval_expr(expr: &Expr, cache: &ResolvedCache) -> Result<Option<Value>> {
    match expr {
        Expr::Literal(value) => Ok(Some(value.clone())),
        Expr::Call { name, args } => cache
            .get(&call_key(name, args))
            .cloned()
            .ok_or_else(|| Error::ReferencedData {
                fetcher: name.clone(),
                args: canonical_args(args),
            }),
        Expr::Concat(terms) => {
            let mut out = String::new();
            for term in terms {
                match eval_expr(term, cache)? {
                    Some(value) => out.push_str(&stringify(&value)),
                    None => return Ok(None),
                }
            }
            Ok(Some(Value::String(out)))
        }
    }
}

/// Resolve all distinct fetcher invocations concurrently.
async fn resolve_calls(
    calls: HashMap<CallKey, (String, Vec<Value>)>,
    fetchers: &FetcherSet,
) -> Result<ResolvedCache> {
    let mut join_set = JoinSet::new();
    for (key, (name, args)) in calls {
        // Discovery already validated every fetcher name.
        let fetcher = Arc::clone(fetchers.get(&name).expect("fetcher validated in discovery"));
        join_set.spawn(async move {
            let result = fetcher.fetch(&args).await;
            (key, result)
        });
    }

    let mut cache = ResolvedCache::new();
    while let Some(joined) = join_set.join_next().await {
        let (key, result) = joined.map_err(|e| Error::Fetch(Box::new(e)))?;
        cache.insert(key, result.map_err(Error::Fetch)?);
    }
    Ok(cache)
}

fn call_key(name: &str, args: &[Value]) -> CallKey {
    (name.to_string(), canonical_args(args))
}

fn canonical_args(args: &[Value]) -> String {
    serde_json::to_string(args).expect("JSON values always serialize")
}

/// Render a resolved value into template output.
///
/// Strings are verbatim; other scalars use their JSON form; compound
/// values serialize to compact JSON.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
