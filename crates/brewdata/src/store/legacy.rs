use super::resolver::ResolverChain;
use super::types::Ingredient;

/// Decodes the old inline ingredient map, `"<material>[,<variant>]" -> amount`.
pub fn decode_legacy_ingredients<'a, I>(entries: I, resolvers: &ResolverChain) -> Vec<Ingredient>
where
    I: IntoIterator<Item = (&'a str, i64)>,
{
    entries
        .into_iter()
        .filter_map(|(key, amount)| decode_entry(key, amount, resolvers))
        .collect()
}

fn decode_entry(key: &str, amount: i64, resolvers: &ResolverChain) -> Option<Ingredient> {
    let mut parts = key.split(',').collect::<Vec<_>>();
    while parts.len() > 1 && parts.last().is_some_and(|part| part.is_empty()) {
        parts.pop();
    }
    // Only an exact `material,variant` pair carries a variant.
    let (material, variant) = match parts.as_slice() {
        [material, variant] => (*material, Some(parse_variant(variant))),
        [material, ..] => (*material, None),
        [] => (key, None),
    };
    let material = resolvers.resolve(material.trim())?;
    let amount = u32::try_from(amount).ok()?;
    Some(Ingredient {
        material,
        variant,
        amount,
    })
}

// Old writers stored the damage value verbatim; anything unreadable meant 0.
fn parse_variant(raw: &str) -> i16 {
    raw.trim().parse::<i16>().unwrap_or(0)
}
