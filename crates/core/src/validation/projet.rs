//! Declarative field tables for PCRS projects and their sub-entities.

use super::cross_field::PairedFields;
use super::field::PHONE_RE;
use super::messages::MessageKey as K;
use super::schema::{EntityDefinition, EntityKind, FieldSpec};
use super::sequence::SequenceRule;

pub const REGIMES: &[&str] = &["production", "maj", "anticipation"];

pub const PROJET_NATURES: &[&str] = &["vecteur", "raster", "mixte"];

pub const ROLES: &[&str] = &[
    "aplc",
    "porteur",
    "financeur",
    "diffuseur",
    "presta_vol",
    "presta_lidar",
    "controleur",
];

pub const LIVRABLE_NATURES: &[&str] = &["geotiff", "jpeg2000", "gml", "dxf", "dwg", "gpkg"];

pub const LICENCES: &[&str] = &["ouvert_lo", "ouvert_odbl", "ferme"];

pub const DIFFUSIONS: &[&str] = &["wms", "wmts", "wfs", "tms", "none"];

pub const STOCKAGES: &[&str] = &["http", "ftp", "sftp"];

/// Lifecycle stages, in their natural order.
pub const STATUTS: &[&str] = &[
    "investigation",
    "convention_signee",
    "marche_public_en_cours",
    "prod_en_cours",
    "controle_en_cours",
    "realise",
    "disponible",
    "obsolete",
];

pub const SUBVENTION_NATURES: &[&str] = &["feder", "cepr", "detr"];

pub const ETAPES_ORDER: SequenceRule = SequenceRule::NonDecreasingDates {
    field: "date_debut",
    key: K::EtapesOrder,
};

pub const DIFFUSION_PAIR: PairedFields = PairedFields {
    first: "diffusion_url",
    second: "diffusion_layer",
    key: K::BothDiffusionRequired,
};

/// Every entity definition, root last.
pub fn definitions() -> Vec<EntityDefinition> {
    vec![
        acteur(),
        livrable(),
        etape(),
        subvention(),
        reutilisation(),
        projet(),
    ]
}

fn acteur() -> EntityDefinition {
    EntityDefinition {
        kind: EntityKind::Acteur,
        fields: vec![
            FieldSpec::number("siren")
                .required()
                .message(K::NumberBase, "Le siren doit être un nombre")
                .message(K::AnyRequired, "Le siren est obligatoire"),
            FieldSpec::string("nom")
                .nullable()
                .message(K::StringBase, "Le nom doit être une chaine de caractères")
                .message(K::StringEmpty, "Le nom ne peut pas être vide"),
            FieldSpec::string("interlocuteur")
                .nullable()
                .message(K::StringBase, "L’interlocuteur doit être une chaine de caractères")
                .message(K::StringEmpty, "Le champ interlocuteur ne peut pas être vide"),
            FieldSpec::email("mail")
                .nullable()
                .message(K::StringBase, "L’adresse courriel doit être une chaine de caractères")
                .message(K::StringEmail, "L’adresse courriel n’est pas valide"),
            FieldSpec::string("telephone")
                .pattern(&PHONE_RE)
                .nullable()
                .message(K::StringBase, "Le numéro de téléphone doit être une chaine de caractères")
                .message(K::StringPattern, "Le numéro de téléphone est invalide"),
            FieldSpec::one_of("role", ROLES)
                .required()
                .message(K::AnyOnly, "Ce rôle n’existe pas")
                .message(K::AnyRequired, "Le rôle est obligatoire")
                .update_message(K::AnyOnly, "Le rôle n’est pas valide"),
            FieldSpec::number("finance_part_perc")
                .nullable()
                .message(K::NumberBase, "Le financement doit être un nombre"),
            FieldSpec::number("finance_part_euro")
                .nullable()
                .message(K::NumberBase, "Le financement doit être un nombre"),
        ],
        paired: Vec::new(),
    }
}

fn livrable() -> EntityDefinition {
    EntityDefinition {
        kind: EntityKind::Livrable,
        fields: vec![
            FieldSpec::string("nom")
                .required()
                .message(K::StringBase, "Le nom doit être une chaine de caractères")
                .message(K::AnyRequired, "Le nom est obligatoire")
                .message(K::StringEmpty, "Le nom ne peut pas être vide"),
            FieldSpec::one_of("nature", LIVRABLE_NATURES)
                .required()
                .message(K::AnyOnly, "Cette nature n’est pas valide")
                .message(K::AnyRequired, "La nature est obligatoire"),
            FieldSpec::one_of("licence", LICENCES)
                .required()
                .message(K::AnyOnly, "Ce type de licence n’est pas valide")
                .message(K::AnyRequired, "Le type de licence est obligatoire"),
            FieldSpec::one_of("diffusion", DIFFUSIONS)
                .nullable()
                .message(K::AnyOnly, "Ce type de diffusion n’est pas valide"),
            FieldSpec::uri("diffusion_url")
                .nullable()
                .message(K::StringBase, "L’URL de diffusion doit être une chaine de caractères")
                .message(K::StringUri, "L’URL de diffusion n’est pas valide"),
            FieldSpec::string("diffusion_layer")
                .nullable()
                .message(K::StringBase, "La nom de la couche doit être une chaine de caractères"),
            FieldSpec::date("date_livraison").nullable(),
            FieldSpec::integer("cout")
                .nullable()
                .message(K::NumberBase, "Le coût doit être un nombre entier")
                .message(K::NumberInteger, "Le coût doit être un nombre entier"),
            FieldSpec::number("avancement")
                .nullable()
                .message(K::NumberBase, "L’avancement doit être un nombre"),
            FieldSpec::number("recouvr_lat")
                .nullable()
                .message(K::NumberBase, "Le recouvrement doit être un nombre"),
            FieldSpec::number("recouvr_lon")
                .nullable()
                .message(K::NumberBase, "Le recouvrement doit être un nombre"),
            FieldSpec::integer("focale")
                .nullable()
                .message(K::NumberBase, "La focale doit être un nombre entier")
                .message(K::NumberInteger, "La focale doit être un nombre entier"),
            FieldSpec::string("stockage_id").nullable(),
            FieldSpec::one_of("stockage", STOCKAGES)
                .nullable()
                .message(K::AnyOnly, "Ce type de stockage n’est pas valide"),
            FieldSpec::boolean("stockage_public").nullable(),
            FieldSpec::boolean("stockage_telechargement").nullable(),
            FieldSpec::object("stockage_params").nullable(),
            FieldSpec::string("stockage_erreur").nullable(),
        ],
        paired: vec![DIFFUSION_PAIR],
    }
}

fn etape() -> EntityDefinition {
    EntityDefinition {
        kind: EntityKind::Etape,
        fields: vec![
            FieldSpec::one_of("statut", STATUTS)
                .required()
                .message(K::AnyOnly, "Cette étape n’existe pas")
                .message(K::AnyRequired, "Une étape est obligatoire")
                .update_message(K::AnyOnly, "Ce statut n’est pas valide"),
            FieldSpec::date("date_debut")
                .nullable()
                .always_required()
                .message(K::AnyRequired, "Une date est obligatoire"),
        ],
        paired: Vec::new(),
    }
}

fn subvention() -> EntityDefinition {
    EntityDefinition {
        kind: EntityKind::Subvention,
        fields: vec![
            FieldSpec::string("nom")
                .required()
                .message(K::StringBase, "Le nom doit être une chaine de caractères")
                .message(K::AnyRequired, "Le nom est obligatoire")
                .message(K::StringEmpty, "Le nom ne peut pas être vide"),
            FieldSpec::one_of("nature", SUBVENTION_NATURES)
                .required()
                .message(K::AnyOnly, "Cette nature n’est pas valide")
                .message(K::AnyRequired, "La nature est obligatoire"),
            FieldSpec::number("montant")
                .nullable()
                .message(K::NumberBase, "Le montant doit être un nombre"),
            FieldSpec::date("echeance").nullable(),
        ],
        paired: Vec::new(),
    }
}

fn reutilisation() -> EntityDefinition {
    EntityDefinition {
        kind: EntityKind::Reutilisation,
        fields: vec![
            FieldSpec::string("titre")
                .required()
                .message(K::StringBase, "Le titre doit être une chaine de caractères")
                .message(K::AnyRequired, "Le titre est obligatoire")
                .message(K::StringEmpty, "Le titre ne peut pas être vide"),
            FieldSpec::uri("lien")
                .required()
                .message(K::StringBase, "Le lien doit être une chaine de caractères")
                .message(K::StringUri, "Le lien n’est pas valide")
                .message(K::AnyRequired, "Le lien est obligatoire"),
            FieldSpec::string("description")
                .allow_empty()
                .nullable()
                .message(K::StringBase, "La description doit être une chaine de caractères"),
            FieldSpec::string("imageKey")
                .nullable()
                .message(K::StringBase, "La clé de l’image doit être une chaine de caractères"),
            FieldSpec::uri("imageURL")
                .nullable()
                .message(K::StringBase, "L’URL de l’image doit être une chaine de caractères")
                .message(K::StringUri, "L’URL de l’image n’est pas valide"),
        ],
        paired: Vec::new(),
    }
}

fn projet() -> EntityDefinition {
    EntityDefinition {
        kind: EntityKind::Projet,
        fields: vec![
            FieldSpec::string("nom")
                .min_len(3)
                .required()
                .message(K::StringBase, "Le nom doit être une chaine de caractères")
                .message(K::StringMin, "Le nom doit faire plus de trois caractères")
                .message(K::AnyRequired, "La clé \"nom\" est obligatoire")
                .message(K::StringEmpty, "Le nom ne peut pas être vide")
                .update_message(K::StringMin, "Le nom doit comporter au moins trois caractères")
                .update_message(K::StringEmpty, "Le nom ne peut être vide"),
            FieldSpec::one_of("regime", REGIMES)
                .required()
                .message(K::AnyOnly, "Ce type de régime n’est pas valide")
                .message(K::AnyRequired, "La clé \"regime\" est obligatoire")
                .update_message(K::AnyOnly, "Ce régime n’est pas valide"),
            FieldSpec::one_of("nature", PROJET_NATURES)
                .required()
                .message(K::AnyOnly, "Cette nature n’est pas valide")
                .message(K::AnyRequired, "La clé \"nature\" est obligatoire"),
            FieldSpec::integer("budget")
                .min(0.0)
                .nullable()
                .message(K::NumberBase, "Le budget doit être un nombre")
                .message(K::NumberInteger, "Le budget doit être un nombre entier")
                .message(K::NumberMin, "Le budget ne peut pas être négatif"),
            FieldSpec::entities("livrables", EntityKind::Livrable)
                .min_items(1)
                .required()
                .message(K::ArrayBase, "Les livrables doivent être dans un tableau")
                .message(K::ArrayMin, "Au moins un livrable est obligatoire")
                .message(K::AnyRequired, "La clé \"livrables\" est obligatoire"),
            FieldSpec::entities("acteurs", EntityKind::Acteur)
                .min_items(1)
                .required()
                .message(K::ArrayBase, "Les acteurs doivent être dans un tableau")
                .message(K::ArrayMin, "Au moins un acteur est obligatoire")
                .message(K::AnyRequired, "La clé \"acteurs\" est obligatoire"),
            FieldSpec::perimetres("perimetres")
                .min_items(1)
                .required()
                .message(K::ArrayBase, "Les périmètres doivent être dans un tableau")
                .message(K::ArrayMin, "Au moins un périmètre est obligatoire")
                .message(K::AnyRequired, "La clé \"perimetres\" est obligatoire"),
            FieldSpec::entities("etapes", EntityKind::Etape)
                .ordered_by(ETAPES_ORDER)
                .required()
                .message(K::ArrayBase, "Les étapes doivent être dans un tableau")
                .message(K::AnyRequired, "La clé \"etapes\" est obligatoire"),
            FieldSpec::entities("subventions", EntityKind::Subvention)
                .nullable()
                .required()
                .message(K::ArrayBase, "Les subventions doivent être dans un tableau")
                .message(K::AnyRequired, "La clé \"subventions\" est obligatoire"),
            FieldSpec::entities("reutilisations", EntityKind::Reutilisation)
                .nullable()
                .message(K::ArrayBase, "Les réutilisations doivent être dans un tableau"),
            FieldSpec::string("metaPerimetreMillesime")
                .nullable()
                .message(K::StringBase, "Le millésime doit être une chaine de caractères"),
        ],
        paired: Vec::new(),
    }
}
