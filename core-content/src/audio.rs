//! Recitation URL resolution.
//!
//! Combines URLs embedded in a source payload with URLs rendered from the
//! configured [`AudioTemplates`]. Embedded URLs come first.

use core_runtime::config::{placeholders, AudioTemplates};

use crate::model::AudioCandidates;

/// Values available to a template.
#[derive(Debug, Clone, Copy)]
struct TemplateVars {
    chapter: u16,
    verse: Option<u16>,
    global: Option<u32>,
}

impl TemplateVars {
    fn lookup(&self, name: &str) -> Option<String> {
        match name {
            "chapter" => Some(self.chapter.to_string()),
            "chapter:03" => Some(format!("{:03}", self.chapter)),
            "verse" => self.verse.map(|v| v.to_string()),
            "verse:03" => self.verse.map(|v| format!("{:03}", v)),
            "global" => self.global.map(|g| g.to_string()),
            _ => None,
        }
    }
}

/// Renders `template`, or `None` if any placeholder has no value.
fn render(template: &str, vars: &TemplateVars) -> Option<String> {
    let mut out = template.to_string();
    for name in placeholders(template) {
        let value = vars.lookup(name)?;
        out = out.replacen(&format!("{{{}}}", name), &value, 1);
    }
    Some(out)
}

/// Builds ordered audio candidates for chapters and verses.
#[derive(Debug, Clone, Default)]
pub struct AudioResolver {
    templates: AudioTemplates,
}

impl AudioResolver {
    pub fn new(templates: AudioTemplates) -> Self {
        Self { templates }
    }

    pub fn verse_candidates<I, S>(
        &self,
        embedded: I,
        chapter: u16,
        verse: u16,
        global: Option<u32>,
    ) -> AudioCandidates
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let vars = TemplateVars {
            chapter,
            verse: Some(verse),
            global,
        };
        self.resolve(embedded, &self.templates.verse, &vars)
    }

    pub fn chapter_candidates<I, S>(&self, embedded: I, chapter: u16) -> AudioCandidates
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let vars = TemplateVars {
            chapter,
            verse: None,
            global: None,
        };
        self.resolve(embedded, &self.templates.chapter, &vars)
    }

    fn resolve<I, S>(&self, embedded: I, templates: &[String], vars: &TemplateVars) -> AudioCandidates
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut candidates: AudioCandidates = embedded.into_iter().collect();
        for url in templates.iter().filter_map(|t| render(t, vars)) {
            candidates.push(url);
        }
        candidates
    }
}
