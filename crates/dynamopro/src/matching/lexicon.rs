//! Bilingual keyword lexicon.
//!
//! Recommendation titles arrive as free text in French, Dutch or English.
//! Tags are derived here exactly once per recommendation; all downstream
//! matching is a set intersection on [`Keyword`], so no locale-specific
//! substring logic leaks into the matcher.

use std::collections::BTreeSet;

use crate::catalog::Keyword;

/// Surface forms recognized for each tag. Stems are deliberately short so
/// inflected forms ("isolatie", "isolation") hit the same entry.
const LEXICON: &[(Keyword, &[&str])] = &[
    (Keyword::Solar, &["solar", "solaire", "photovolta", "zonnepan", "fotovolta"]),
    (Keyword::HeatPump, &["heat pump", "pompe à chaleur", "pompe a chaleur", "warmtepomp"]),
    (Keyword::Insulation, &["insulation", "isolation", "isolatie", "isoler", "isoleren"]),
    (Keyword::Windows, &["window", "fenêtre", "fenetre", "raam", "ramen", "vitrage", "beglazing"]),
    (Keyword::Led, &["led"]),
    (Keyword::Rainwater, &["rainwater", "eau de pluie", "regenwater", "citerne"]),
    (Keyword::Audit, &["audit"]),
    (Keyword::Renovation, &["renovation", "rénovation", "renovatie"]),
    (Keyword::Heating, &["heating", "chauffage", "verwarming", "chaudière", "chaudiere", "ketel"]),
    (Keyword::Ventilation, &["ventilation", "ventilatie"]),
    (Keyword::Biodiversity, &["biodiversity", "biodiversité", "biodiversite", "biodiversiteit"]),
    (Keyword::Circular, &["circular", "circulaire", "réemploi", "reemploi", "hergebruik"]),
    (Keyword::Waste, &["waste", "déchet", "dechet", "afval", "compost"]),
    (Keyword::EvCharging, &["charging", "borne de recharge", "laadpaal", "laadstation"]),
    (Keyword::Battery, &["battery", "batterie", "batterij", "thuisbatterij"]),
    (Keyword::GreenRoof, &["green roof", "toiture verte", "groendak"]),
    (Keyword::WaterSaving, &["water saving", "économie d'eau", "economie d'eau", "waterbesparing"]),
    (Keyword::Biomass, &["biomass", "biomasse", "biomassa", "pellet"]),
    (Keyword::Cogeneration, &["cogeneration", "cogénération", "cogeneration", "warmtekracht", "wkk"]),
];

/// Derive measure tags from free text, case-insensitively.
pub fn tags_from_text(text: &str) -> BTreeSet<Keyword> {
    let haystack = text.to_lowercase();
    LEXICON
        .iter()
        .filter(|(_, stems)| stems.iter().any(|stem| haystack.contains(stem)))
        .map(|(keyword, _)| *keyword)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn french_solar_title_maps_to_solar_tag() {
        let tags = tags_from_text("Installation de panneaux solaires photovoltaïques");
        assert!(tags.contains(&Keyword::Solar));
    }

    #[test]
    fn dutch_and_english_forms_map_to_the_same_tags() {
        assert_eq!(
            tags_from_text("Dakisolatie plaatsen"),
            tags_from_text("Install roof insulation"),
        );
    }

    #[test]
    fn multiple_tags_can_be_derived_from_one_title() {
        let tags = tags_from_text("Rénovation : pompe à chaleur et isolation des murs");
        assert!(tags.contains(&Keyword::Renovation));
        assert!(tags.contains(&Keyword::HeatPump));
        assert!(tags.contains(&Keyword::Insulation));
    }

    #[test]
    fn unrelated_text_yields_no_tags() {
        assert!(tags_from_text("Agrandir la terrasse").is_empty());
    }
}
