//! Prompt template rendering.
//!
//! Templates are plain text with `{{ name }}` placeholders. Nothing else in a
//! template is interpreted: `{%`, `{#` or an unmatched `{{` in user-supplied
//! markdown renders verbatim.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use minijinja::{Environment, UndefinedBehavior, context};
use regex::Regex;

/// Placeholder name to substituted value.
pub type Bindings<'a> = BTreeMap<&'a str, String>;

static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").expect("placeholder regex")
});

/// Render `template`, replacing each `{{ name }}` placeholder with its binding.
///
/// Every placeholder is expanded exactly once. Substituted values are inserted
/// verbatim and never rendered again, so a value containing `{{ topic }}` stays
/// literal. Unknown placeholders render as empty text.
pub fn render(template: &str, bindings: &Bindings<'_>) -> Result<String> {
    let (source, text) = compile(template);
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Lenient);
    env.render_str(&source, context! { vars => bindings, text => text })
        .context("render prompt template")
}

/// Rewrite `template` so placeholders become lookups into `vars` and every
/// literal run becomes a lookup into `text`.
fn compile(template: &str) -> (String, Vec<&str>) {
    let mut source = String::new();
    let mut text = Vec::new();
    let mut last = 0;

    for caps in PLACEHOLDER_RE.captures_iter(template) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        push_literal(&mut source, &mut text, &template[last..whole.start()]);
        source.push_str(&format!("{{{{ vars[\"{}\"] }}}}", name.as_str()));
        last = whole.end();
    }
    push_literal(&mut source, &mut text, &template[last..]);
    (source, text)
}

fn push_literal<'t>(source: &mut String, text: &mut Vec<&'t str>, literal: &'t str) {
    if literal.is_empty() {
        return;
    }
    source.push_str(&format!("{{{{ text[{}] }}}}", text.len()));
    text.push(literal);
}
