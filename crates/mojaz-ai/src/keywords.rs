//! Keyword sets for the local fallback classifier.
//!
//! Matching is plain substring containment over lowercased text, so a keyword
//! also matches inside longer words (e.g. `صور` inside `صورة`).

/// Terms suggesting supporting documentation exists.
pub const EVIDENCE_KEYWORDS: &[&str] = &[
    "صورة", "صور", "إيصال", "مرفق", "وثيقة", "ورقة", "فحص", "استمارة", "عقد", "تقرير",
];

/// Terms suggesting a substantive factual argument rather than an apology.
pub const STRONG_ARGUMENT_KEYWORDS: &[&str] = &[
    "خطأ", "خاطئ", "لوحة", "دفعت", "ورشة", "عطل", "معطلة", "رادار", "كاميرا",
];

/// Apology / excuse phrases. Detected but not used in the decision.
pub const WEAK_PHRASES: &[&str] = &[
    "آسف", "أعتذر", "مستعجل", "متعب", "مشتت", "نسيت", "لم أركز", "ضغط نفسي",
];

/// True if `text` (already normalised) contains any of `keywords`.
pub fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}
