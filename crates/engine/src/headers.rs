use crate::error::ReconError;

/// Normalize a raw header to its canonical lookup form: lowercase,
/// accents stripped, every non-alphanumeric run collapsed to `_`.
/// "Título Vencido  (R$)" and "titulo_vencido_r" resolve identically.
pub fn normalize_header(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut last_sep = true;
    for c in raw.trim().chars() {
        let c = strip_accent(c);
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
            last_sep = false;
        } else if !last_sep {
            out.push('_');
            last_sep = true;
        }
    }
    while out.ends_with('_') {
        out.pop();
    }
    out
}

fn strip_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'Á' | 'À' | 'Â' | 'Ã' => 'a',
        'é' | 'ê' | 'É' | 'Ê' => 'e',
        'í' | 'Í' => 'i',
        'ó' | 'ô' | 'õ' | 'Ó' | 'Ô' | 'Õ' => 'o',
        'ú' | 'ü' | 'Ú' | 'Ü' => 'u',
        'ç' | 'Ç' => 'c',
        other => other,
    }
}

/// One canonical field and the header variants that may carry it,
/// in priority order.
pub struct FieldSpec {
    pub field: &'static str,
    pub synonyms: &'static [&'static str],
}

/// Headers of one source, pre-normalized once so repeated lookups are
/// index math rather than string scans.
pub struct HeaderMap {
    source: String,
    raw: Vec<String>,
    normalized: Vec<String>,
}

impl HeaderMap {
    pub fn new(source: &str, headers: &[String]) -> Self {
        Self {
            source: source.to_string(),
            raw: headers.to_vec(),
            normalized: headers.iter().map(|h| normalize_header(h)).collect(),
        }
    }

    /// Resolve one field to a column index. Exact synonym match wins;
    /// otherwise the first column containing every `_`-separated token
    /// of a synonym (in synonym priority order).
    pub fn find(&self, spec: &FieldSpec) -> Option<usize> {
        for syn in spec.synonyms {
            if let Some(idx) = self.normalized.iter().position(|h| h == syn) {
                return Some(idx);
            }
        }
        for syn in spec.synonyms {
            let tokens: Vec<&str> = syn.split('_').filter(|t| !t.is_empty()).collect();
            if tokens.is_empty() {
                continue;
            }
            if let Some(idx) = self
                .normalized
                .iter()
                .position(|h| tokens.iter().all(|t| h.contains(t)))
            {
                return Some(idx);
            }
        }
        None
    }

    /// Resolve a required field, failing with the full candidate list and
    /// the columns actually present so the caller can fix the input.
    pub fn resolve(&self, spec: &FieldSpec) -> Result<usize, ReconError> {
        self.find(spec).ok_or_else(|| ReconError::SchemaResolution {
            source: self.source.clone(),
            field: spec.field.to_string(),
            candidates: spec.synonyms.iter().map(|s| s.to_string()).collect(),
            available: self.raw.clone(),
        })
    }
}
