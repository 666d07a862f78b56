//! Known species labels
//!
//! The classes the bundled model was fine-tuned on, in training order. The
//! order doubles as the default index → label table.

/// Every label the bundled model may emit
pub const CATEGORIES: [&str; 103] = [
    "accipiter_nisus",
    "actitis_hypoleucos",
    "aegithalos_caudatus",
    "alcedo_atthis",
    "anas_clypeata",
    "anas_crecca",
    "anas_platyrhynchos",
    "aquila_chrysaetos",
    "ardea_alba",
    "ardea_cinerea",
    "ardea_purpurea",
    "ardeola_ralloides",
    "arenaria_interpres",
    "asio_flammeus",
    "asio_otus",
    "athene_noctua",
    "aythya_ferina",
    "botaurus_stellaris",
    "bubulcus_ibis",
    "buteo_buteo",
    "calidris_alpina",
    "carduelis_carduelis",
    "carduelis_chloris",
    "carduelis_spinus",
    "charadrius_dubius",
    "charadrius_morinellus",
    "ciconia_ciconia",
    "cinclus_cinclus",
    "circus_aeruginosus",
    "circus_pygargus",
    "cisticola_juncidis",
    "coccothraustes_coccothraustes",
    "coracias_garrulus",
    "cygnus_olor",
    "dendrocopos_major",
    "egretta_garzetta",
    "emberiza_schoeniclus",
    "erithacus_rubecula",
    "falco_naumanni",
    "falco_peregrinus",
    "falco_tinnunculus",
    "falco_vespertinus",
    "fringilla_coelebs",
    "fringilla_montifringilla",
    "fulica_atra",
    "gallinago_gallinago",
    "gallinula_chloropus",
    "garrulus_glandarius",
    "gypaetus_barbatus",
    "gyps_fulvus",
    "haliaeetus_albicilla",
    "himantopus_himantopus",
    "hirundo_rustica",
    "ixobrychus_minutus",
    "jynx_torquilla",
    "lagopus_mutus",
    "lanius_collurio",
    "loxia_curvirostra",
    "merops_apiaster",
    "milvus_migrans",
    "milvus_milvus",
    "montifringilla_nivalis",
    "motacilla_alba",
    "motacilla_cinerea",
    "muscicapa_striata",
    "nycticorax_nycticorax",
    "oenanthe_oenanthe",
    "pandion_haliaetus",
    "parus_ater",
    "parus_caeruleus",
    "parus_cristatus",
    "parus_major",
    "parus_palustris",
    "phalacrocorax_carbo",
    "philomachus_pugnax",
    "phoenicopterus_roseus",
    "phoenicurus_ochruros",
    "phoenicurus_phoenicurus",
    "phylloscopus_collybita",
    "picus_viridis",
    "platalea_leucorodia",
    "plegadis_falcinellus",
    "podiceps_cristatus",
    "porzana_parva",
    "prunella_modularis",
    "rallus_aquaticus",
    "recurvirostra_avosetta",
    "regulus_regulus",
    "remiz_pendulinus",
    "saxicola_torquata",
    "sitta_europaea",
    "strix_aluco",
    "sylvia_atricapilla",
    "sylvia_melanocephala",
    "tachybaptus_ruficollis",
    "tetrao_tetrix",
    "threskiornis_aethiopica",
    "tringa_glareola",
    "tringa_nebularia",
    "troglodytes_troglodytes",
    "turdus_merula",
    "upupa_epops",
    "vanellus_vanellus",
];

/// Whether `label` is one of the bundled categories
pub fn is_known_category(label: &str) -> bool {
    CATEGORIES.contains(&label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_categories_are_unique() {
        let unique: HashSet<_> = CATEGORIES.iter().collect();
        assert_eq!(unique.len(), CATEGORIES.len());
    }

    #[test]
    fn test_categories_use_separator_form() {
        for label in CATEGORIES {
            assert!(label.contains('_'), "{label}");
            assert!(!label.contains(' '), "{label}");
            assert_eq!(label, label.to_lowercase());
        }
    }

    #[test]
    fn test_membership() {
        assert!(is_known_category("turdus_merula"));
        assert!(!is_known_category("Turdus Merula"));
        assert!(!is_known_category("passer_domesticus"));
    }
}
