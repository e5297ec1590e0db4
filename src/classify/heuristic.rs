// src/classify/heuristic.rs
//! Cheap keyword classifier over topic titles. No external calls; used to
//! screen backfill candidates before spending a real classification on them.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::Category;

/// Ordered rule list: the first matching category wins. Stems are preferred
/// over full forms so inflected Greek variants still match.
static RULES: Lazy<Vec<(Category, Regex)>> = Lazy::new(|| {
    let compile = |pattern: &str| Regex::new(pattern).expect("heuristic pattern");
    vec![
        (
            Category::Sports,
            compile(
                r"(?i)(ποδόσφαιρ|μπάσκετ|πρωτάθλημα|πρωταθλητ|γκολ|ολυμπιακ|παναθηναϊκ|μουντιάλ|τένις|στίβο|eurobasket|euroleague|champions\s+league|τελικό[ςσ]?\b|αγώνα[ςσ]?\b)",
            ),
        ),
        (
            Category::Screen,
            compile(r"(?i)(τηλεόραση|τηλεοπτικ|σειρά\b|ταινία|σινεμά|netflix|ηθοποι|τρέιλερ)"),
        ),
        (
            Category::Culture,
            compile(r"(?i)(συναυλία|μουσείο|θέατρο|θεατρικ|έκθεση|φεστιβάλ|βιβλίο|λογοτεχν|πολιτισμ)"),
        ),
        (
            Category::PoliticsEconomy,
            compile(
                r"(?i)(κυβέρνησ|πρωθυπουργ|υπουργ|βουλή|βουλευτ|εκλογ|κόμμα|φορολογ|οικονομ|τράπεζ|επίδομα|σύνταξ|μισθ|πληθωρισμ|νομοσχέδι)",
            ),
        ),
        (
            Category::World,
            compile(
                r"(?i)(πόλεμο|ουκραν|ρωσί|ρωσικ|γάζα|ισραήλ|ΝΑΤΟ|ΟΗΕ|λευκό[ςσ]?\s+οίκο|διεθν|ευρωπαϊκή\s+ένωση)",
            ),
        ),
        (
            Category::Social,
            compile(
                r"(?i)(σεισμ|πυρκαγι|φωτιά|κακοκαιρ|τροχαίο|αστυνομ|έγκλημα|δολοφον|απεργ|σχολεί|νοσοκομεί|κυκλοφορ|δυστύχημα)",
            ),
        ),
        (
            Category::Fun,
            compile(r"(?i)(συνταγή|βόλτ|απόδραση|ταξίδι|γιορτή|πανηγύρι|διασκέδασ)"),
        ),
    ]
});

/// Predict a category from a topic title, or `None` when no rule fires.
pub fn predict_category(title: &str) -> Option<Category> {
    if title.trim().is_empty() {
        return None;
    }
    RULES
        .iter()
        .find(|(_, re)| re.is_match(title))
        .map(|(category, _)| *category)
}
