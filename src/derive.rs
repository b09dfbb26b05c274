//! Pure projections and text derivation for cards and detail records.

use crate::config::Locale;
use crate::pokemon::{
    ChainLink, EvolutionChain, Pokemon, PokemonCard, PokemonDetail, PokemonStat, SpeciesDetail,
    StatEntry,
};

/// Language used when the locale's own language has no entry.
const FALLBACK_LANGUAGE: &str = "en";

/// Maximum number of abilities shown on a card.
const CARD_ABILITIES: usize = 3;

/// Turn an API slug into a display name: `"charizard-mega-x"` becomes `"Charizard Mega X"`.
pub fn normalize_name(slug: &str) -> String {
    slug.split('-')
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn to_card(pokemon: &Pokemon) -> PokemonCard {
    PokemonCard {
        id: pokemon.id,
        name: pokemon.name.clone(),
        display_name: normalize_name(&pokemon.name),
        image: pokemon.sprites.preferred_image().unwrap_or_default().to_string(),
        types: pokemon
            .types
            .iter()
            .map(|t| normalize_name(&t.r#type.name))
            .collect(),
        abilities: pokemon
            .abilities
            .iter()
            .filter(|a| !a.is_hidden)
            .take(CARD_ABILITIES)
            .map(|a| normalize_name(&a.ability.name))
            .collect(),
    }
}

/// Flavor text in the locale's language, else English, with control breaks flattened.
pub fn description(species: &SpeciesDetail, locale: Locale) -> String {
    let find = |lang: &str| {
        species
            .flavor_text_entries
            .iter()
            .find(|entry| entry.language.name == lang)
    };
    find(locale.code())
        .or_else(|| find(FALLBACK_LANGUAGE))
        .map(|entry| entry.flavor_text.replace(['\u{c}', '\n'], " ").trim().to_string())
        .unwrap_or_default()
}

/// Genus in the locale's language, else English.
pub fn category(species: &SpeciesDetail, locale: Locale) -> String {
    let find = |lang: &str| species.genera.iter().find(|g| g.language.name == lang);
    find(locale.code())
        .or_else(|| find(FALLBACK_LANGUAGE))
        .map(|g| g.genus.clone())
        .unwrap_or_default()
}

/// Display names along the chain from the root, following only the first
/// child at each stage. Branching evolutions surface their first branch only.
pub fn evolution_names(root: &ChainLink) -> Vec<String> {
    let mut names = Vec::new();
    let mut current = Some(root);
    while let Some(link) = current {
        names.push(normalize_name(&link.species.name));
        current = link.evolves_to.first();
    }
    names
}

/// Display name of the highest base stat; the first one listed wins ties.
pub fn top_stat(pokemon: &Pokemon) -> String {
    pokemon
        .stats
        .iter()
        .fold(None, |best: Option<&PokemonStat>, stat| match best {
            Some(b) if b.base_stat >= stat.base_stat => Some(b),
            _ => Some(stat),
        })
        .map(|stat| normalize_name(&stat.stat.name))
        .unwrap_or_default()
}

/// Deterministic descriptive sentence built from type, description, top stat and main ability.
pub fn summary(pokemon: &Pokemon, description: &str, locale: Locale) -> String {
    let name = normalize_name(&pokemon.name);
    let types = pokemon
        .types
        .iter()
        .map(|t| normalize_name(&t.r#type.name))
        .collect::<Vec<_>>()
        .join(&format!(" {} ", locale.conjunction()));
    let stat = top_stat(pokemon);
    let ability = pokemon
        .abilities
        .first()
        .map(|a| normalize_name(&a.ability.name))
        .unwrap_or_default();

    match locale {
        Locale::Es => format!(
            "{name} es un Pokémon de tipo {types}. {description} Sus estadísticas destacan en {stat}, \
             y su habilidad principal es {ability}, lo que lo hace único en combate."
        ),
        Locale::En => format!(
            "{name} is a {types} type Pokémon. {description} Its stats stand out in {stat}, \
             and its main ability is {ability}, which makes it unique in battle."
        ),
    }
}

pub fn to_detail(
    pokemon: &Pokemon,
    species: &SpeciesDetail,
    evolution: &EvolutionChain,
    locale: Locale,
) -> PokemonDetail {
    let description = description(species, locale);
    PokemonDetail {
        card: to_card(pokemon),
        stats: pokemon
            .stats
            .iter()
            .map(|s| StatEntry {
                name: normalize_name(&s.stat.name),
                value: s.base_stat,
            })
            .collect(),
        moves: pokemon
            .moves
            .iter()
            .map(|m| normalize_name(&m.r#move.name))
            .collect(),
        height: pokemon.height,
        weight: pokemon.weight,
        category: category(species, locale),
        evolution_chain: evolution_names(&evolution.chain),
        summary: summary(pokemon, &description, locale),
        description,
    }
}
