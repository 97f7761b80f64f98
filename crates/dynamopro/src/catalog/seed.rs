//! Embedded catalog seed covering the main Belgian schemes. Used when no
//! catalog file is configured; the data mirrors the published regional
//! primes at the time of writing.

use std::collections::BTreeSet;

use super::domain::{
    ConditionKind, DocumentType, Domain, Keyword, LocalizedText, Region, RequiredDocument, Subsidy,
    SubsidyCondition, SubsidyId, SubsidyStatus, UserType,
};

fn set<T: Ord>(values: Vec<T>) -> BTreeSet<T> {
    values.into_iter().collect()
}

pub(super) fn default_subsidies() -> Vec<Subsidy> {
    vec![
        Subsidy {
            id: SubsidyId("prime-isolation-toiture-rw".to_string()),
            name: LocalizedText::new(
                "Prime Énergie - Isolation Toiture",
                "Energiepremie - Dakisolatie",
            ),
            provider: LocalizedText::new(
                "Service Public de Wallonie - Énergie",
                "Waalse Overheidsdienst - Energie",
            ),
            description: LocalizedText::new(
                "Prime pour l'isolation thermique du toit ou des combles dans une habitation existante.",
                "Premie voor de thermische isolatie van het dak of de zolder in een bestaande woning.",
            ),
            regions: set(vec![Region::Wallonia]),
            domains: set(vec![Domain::Energy, Domain::Renovation]),
            eligible_user_types: set(vec![
                UserType::Individual,
                UserType::SelfEmployed,
                UserType::SmallBusiness,
            ]),
            max_amount: Some(2000.0),
            min_amount: None,
            percentage: Some(35.0),
            conditions: vec![
                SubsidyCondition {
                    kind: ConditionKind::Technical,
                    description: LocalizedText::new(
                        "Le coefficient de résistance thermique R doit être supérieur ou égal à 4,5 m²K/W",
                        "De thermische weerstandscoëfficiënt R moet minstens 4,5 m²K/W bedragen",
                    ),
                    technical_parameter: Some("r_value".to_string()),
                    technical_threshold: Some(4.5),
                },
                SubsidyCondition {
                    kind: ConditionKind::Provider,
                    description: LocalizedText::new(
                        "Les travaux doivent être réalisés par un entrepreneur enregistré",
                        "De werken moeten worden uitgevoerd door een geregistreerde aannemer",
                    ),
                    technical_parameter: None,
                    technical_threshold: None,
                },
            ],
            required_documents: vec![
                RequiredDocument {
                    document_type: DocumentType::Identity,
                    description: LocalizedText::new(
                        "Copie de la carte d'identité du demandeur",
                        "Kopie van de identiteitskaart van de aanvrager",
                    ),
                    required: true,
                },
                RequiredDocument {
                    document_type: DocumentType::Ownership,
                    description: LocalizedText::new(
                        "Preuve de propriété ou bail",
                        "Eigendomsbewijs of huurcontract",
                    ),
                    required: true,
                },
                RequiredDocument {
                    document_type: DocumentType::Invoice,
                    description: LocalizedText::new(
                        "Facture détaillée des travaux",
                        "Gedetailleerde factuur van de werken",
                    ),
                    required: true,
                },
                RequiredDocument {
                    document_type: DocumentType::TechnicalSpec,
                    description: LocalizedText::new(
                        "Fiche technique du matériau isolant utilisé",
                        "Technische fiche van het gebruikte isolatiemateriaal",
                    ),
                    required: true,
                },
            ],
            keywords: set(vec![Keyword::Insulation, Keyword::Renovation]),
            min_year_built: None,
            max_year_built: Some(2010),
            status: SubsidyStatus::Active,
            typical_processing_time_days: Some(60),
            application_deadline: None,
            documentation_url: Some(
                "https://energie.wallonie.be/fr/prime-isolation-du-toit.html".to_string(),
            ),
        },
        Subsidy {
            id: SubsidyId("premie-zonnepanelen-vl".to_string()),
            name: LocalizedText::new(
                "Prime Panneaux Photovoltaïques",
                "Premie Zonnepanelen",
            ),
            provider: LocalizedText::new("Fluvius", "Fluvius"),
            description: LocalizedText::new(
                "Prime pour l'installation de panneaux photovoltaïques sur une habitation en Flandre.",
                "Premie voor de installatie van zonnepanelen op een woning in Vlaanderen.",
            ),
            regions: set(vec![Region::Flanders]),
            domains: set(vec![Domain::Energy]),
            eligible_user_types: set(vec![UserType::Individual, UserType::SelfEmployed]),
            max_amount: Some(1500.0),
            min_amount: None,
            percentage: Some(20.0),
            conditions: vec![SubsidyCondition {
                kind: ConditionKind::Technical,
                description: LocalizedText::new(
                    "Puissance crête installée d'au moins 3 kWc",
                    "Geïnstalleerd piekvermogen van minstens 3 kWp",
                ),
                technical_parameter: Some("peak_power_kwp".to_string()),
                technical_threshold: Some(3.0),
            }],
            required_documents: vec![
                RequiredDocument {
                    document_type: DocumentType::Invoice,
                    description: LocalizedText::new(
                        "Facture de l'installation",
                        "Factuur van de installatie",
                    ),
                    required: true,
                },
                RequiredDocument {
                    document_type: DocumentType::Certificate,
                    description: LocalizedText::new(
                        "Attestation de conformité de l'installation",
                        "Conformiteitsattest van de installatie",
                    ),
                    required: true,
                },
            ],
            keywords: set(vec![Keyword::Solar, Keyword::Battery]),
            min_year_built: None,
            max_year_built: None,
            status: SubsidyStatus::Active,
            typical_processing_time_days: Some(45),
            application_deadline: None,
            documentation_url: Some("https://www.fluvius.be/nl/premies".to_string()),
        },
        Subsidy {
            id: SubsidyId("prime-pompe-chaleur-bxl".to_string()),
            name: LocalizedText::new("Prime Pompe à Chaleur", "Premie Warmtepomp"),
            provider: LocalizedText::new(
                "Bruxelles Environnement",
                "Leefmilieu Brussel",
            ),
            description: LocalizedText::new(
                "Prime pour le remplacement d'un chauffage fossile par une pompe à chaleur.",
                "Premie voor de vervanging van een fossiele verwarming door een warmtepomp.",
            ),
            regions: set(vec![Region::Brussels]),
            domains: set(vec![Domain::Energy, Domain::Renovation]),
            eligible_user_types: set(vec![
                UserType::Individual,
                UserType::SmallBusiness,
                UserType::NonProfit,
            ]),
            max_amount: Some(4250.0),
            min_amount: Some(500.0),
            percentage: Some(40.0),
            conditions: vec![SubsidyCondition {
                kind: ConditionKind::Technical,
                description: LocalizedText::new(
                    "Coefficient de performance saisonnier (SCOP) d'au moins 3,5",
                    "Seizoensgebonden prestatiecoëfficiënt (SCOP) van minstens 3,5",
                ),
                technical_parameter: Some("scop".to_string()),
                technical_threshold: Some(3.5),
            }],
            required_documents: vec![
                RequiredDocument {
                    document_type: DocumentType::Quote,
                    description: LocalizedText::new(
                        "Devis signé de l'installateur",
                        "Ondertekende offerte van de installateur",
                    ),
                    required: true,
                },
                RequiredDocument {
                    document_type: DocumentType::TechnicalSpec,
                    description: LocalizedText::new(
                        "Fiche technique de la pompe à chaleur",
                        "Technische fiche van de warmtepomp",
                    ),
                    required: true,
                },
                RequiredDocument {
                    document_type: DocumentType::Photos,
                    description: LocalizedText::new(
                        "Photos de l'installation remplacée",
                        "Foto's van de vervangen installatie",
                    ),
                    required: false,
                },
            ],
            keywords: set(vec![Keyword::HeatPump, Keyword::Heating]),
            min_year_built: None,
            max_year_built: Some(2000),
            status: SubsidyStatus::Active,
            typical_processing_time_days: Some(90),
            application_deadline: None,
            documentation_url: Some(
                "https://environnement.brussels/primes".to_string(),
            ),
        },
        Subsidy {
            id: SubsidyId("prime-citerne-eau-pluie-rw".to_string()),
            name: LocalizedText::new(
                "Prime Citerne d'Eau de Pluie",
                "Premie Regenwaterput",
            ),
            provider: LocalizedText::new(
                "Service Public de Wallonie - Environnement",
                "Waalse Overheidsdienst - Leefmilieu",
            ),
            description: LocalizedText::new(
                "Prime pour l'installation d'une citerne de récupération d'eau de pluie avec raccordement domestique.",
                "Premie voor de installatie van een regenwaterput met huishoudelijke aansluiting.",
            ),
            regions: set(vec![Region::Wallonia]),
            domains: set(vec![Domain::Water]),
            eligible_user_types: set(vec![UserType::Individual]),
            max_amount: Some(1000.0),
            min_amount: None,
            percentage: None,
            conditions: vec![SubsidyCondition {
                kind: ConditionKind::Technical,
                description: LocalizedText::new(
                    "Capacité minimale de 5000 litres",
                    "Minimale capaciteit van 5000 liter",
                ),
                technical_parameter: Some("capacity_liters".to_string()),
                technical_threshold: Some(5000.0),
            }],
            required_documents: vec![RequiredDocument {
                document_type: DocumentType::Invoice,
                description: LocalizedText::new(
                    "Facture de la citerne et du placement",
                    "Factuur van de put en de plaatsing",
                ),
                required: true,
            }],
            keywords: set(vec![Keyword::Rainwater, Keyword::WaterSaving]),
            min_year_built: None,
            max_year_built: None,
            status: SubsidyStatus::Active,
            typical_processing_time_days: Some(30),
            application_deadline: None,
            documentation_url: None,
        },
        Subsidy {
            id: SubsidyId("reduction-impot-federale-ev".to_string()),
            name: LocalizedText::new(
                "Réduction d'Impôt Borne de Recharge",
                "Belastingvermindering Laadpaal",
            ),
            provider: LocalizedText::new(
                "Service Public Fédéral Finances",
                "Federale Overheidsdienst Financiën",
            ),
            description: LocalizedText::new(
                "Réduction d'impôt fédérale pour l'installation d'une borne de recharge intelligente à domicile.",
                "Federale belastingvermindering voor de installatie van een slim laadstation thuis.",
            ),
            regions: set(vec![Region::Federal]),
            domains: set(vec![Domain::Mobility, Domain::Energy]),
            eligible_user_types: set(vec![UserType::Individual, UserType::SelfEmployed]),
            max_amount: Some(1750.0),
            min_amount: None,
            percentage: Some(15.0),
            conditions: vec![SubsidyCondition {
                kind: ConditionKind::Administrative,
                description: LocalizedText::new(
                    "La borne doit être installée à l'adresse du domicile",
                    "Het laadstation moet op het thuisadres worden geïnstalleerd",
                ),
                technical_parameter: None,
                technical_threshold: None,
            }],
            required_documents: vec![
                RequiredDocument {
                    document_type: DocumentType::Invoice,
                    description: LocalizedText::new(
                        "Facture de l'installation de la borne",
                        "Factuur van de installatie van het laadstation",
                    ),
                    required: true,
                },
                RequiredDocument {
                    document_type: DocumentType::Tax,
                    description: LocalizedText::new(
                        "Dernier avertissement-extrait de rôle",
                        "Laatste aanslagbiljet",
                    ),
                    required: true,
                },
            ],
            keywords: set(vec![Keyword::EvCharging]),
            min_year_built: None,
            max_year_built: None,
            status: SubsidyStatus::Active,
            typical_processing_time_days: None,
            application_deadline: None,
            documentation_url: Some("https://finances.belgium.be".to_string()),
        },
        // Scheme kept for historical lookups; suspended pending the 2026
        // budget round.
        Subsidy {
            id: SubsidyId("prime-audit-energetique-rw".to_string()),
            name: LocalizedText::new("Prime Audit Énergétique", "Premie Energieaudit"),
            provider: LocalizedText::new(
                "Service Public de Wallonie - Énergie",
                "Waalse Overheidsdienst - Energie",
            ),
            description: LocalizedText::new(
                "Prime couvrant une partie du coût d'un audit énergétique réalisé par un auditeur agréé.",
                "Premie die een deel van de kosten dekt van een energieaudit door een erkende auditor.",
            ),
            regions: set(vec![Region::Wallonia]),
            domains: set(vec![Domain::Energy]),
            eligible_user_types: set(vec![UserType::Individual]),
            max_amount: Some(660.0),
            min_amount: None,
            percentage: Some(70.0),
            conditions: Vec::new(),
            required_documents: vec![RequiredDocument {
                document_type: DocumentType::Certificate,
                description: LocalizedText::new(
                    "Rapport d'audit signé par l'auditeur agréé",
                    "Auditverslag ondertekend door de erkende auditor",
                ),
                required: true,
            }],
            keywords: set(vec![Keyword::Audit]),
            min_year_built: None,
            max_year_built: None,
            status: SubsidyStatus::Suspended,
            typical_processing_time_days: Some(60),
            application_deadline: None,
            documentation_url: None,
        },
    ]
}
