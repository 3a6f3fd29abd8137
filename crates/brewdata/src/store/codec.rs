use thiserror::Error;

use super::base91::{self, Base91Error};
use super::resolver::ResolverChain;
use super::types::{Ingredient, IngredientBundle, MaterialId};

pub const CURRENT_BLOB_VERSION: u8 = 1;
pub const SUPPORTED_BLOB_VERSIONS: [u8; 2] = [0, 1];

const HAS_VARIANT: u8 = 1 << 0;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngredientCodecError {
    #[error(transparent)]
    Text(#[from] Base91Error),
    #[error("blob is empty")]
    Empty,
    #[error("unsupported blob version {0}")]
    UnsupportedVersion(u8),
    #[error("blob has invalid format: {0}")]
    InvalidFormat(String),
    #[error("cannot encode ingredients: {0}")]
    Unencodable(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum BlobOutcome {
    Decoded(IngredientBundle),
    Corrupt(IngredientCodecError),
}

impl BlobOutcome {
    pub fn into_bundle(self) -> IngredientBundle {
        match self {
            BlobOutcome::Decoded(bundle) => bundle,
            BlobOutcome::Corrupt(_) => IngredientBundle::default(),
        }
    }

    pub fn error(&self) -> Option<&IngredientCodecError> {
        match self {
            BlobOutcome::Decoded(_) => None,
            BlobOutcome::Corrupt(error) => Some(error),
        }
    }
}

pub fn decode_ingredients(blob: &str, resolvers: &ResolverChain) -> BlobOutcome {
    match try_decode_ingredients(blob, resolvers) {
        Ok(bundle) => BlobOutcome::Decoded(bundle),
        Err(error) => BlobOutcome::Corrupt(error),
    }
}

pub fn try_decode_ingredients(
    blob: &str,
    resolvers: &ResolverChain,
) -> Result<IngredientBundle, IngredientCodecError> {
    let bytes = base91::decode(blob)?;
    let (&version, payload) = bytes.split_first().ok_or(IngredientCodecError::Empty)?;
    let mut cursor = 0usize;
    let bundle = match version {
        0 => decode_v0(payload, &mut cursor, resolvers)?,
        1 => decode_v1(payload, &mut cursor, resolvers)?,
        other => return Err(IngredientCodecError::UnsupportedVersion(other)),
    };
    if cursor != payload.len() {
        return Err(invalid_format("unexpected trailing bytes"));
    }
    Ok(bundle)
}

// v0: fixed i16 variant (0 = none) and i16 amount per entry.
fn decode_v0(
    payload: &[u8],
    cursor: &mut usize,
    resolvers: &ResolverChain,
) -> Result<IngredientBundle, IngredientCodecError> {
    let processing_time = read_processing_time(payload, cursor)?;
    let count = read_u8(payload, cursor)?;
    let mut entries = Vec::<Ingredient>::with_capacity(count as usize);
    for _ in 0..count {
        let material = read_string(payload, cursor)?;
        let variant = read_i16(payload, cursor)?;
        let amount = read_i16(payload, cursor)?;
        let amount = u32::try_from(amount).map_err(|_| invalid_format("negative amount"))?;
        if let Some(material) = resolvers.resolve(&material) {
            entries.push(Ingredient {
                material,
                variant: (variant != 0).then_some(variant),
                amount,
            });
        }
    }
    Ok(IngredientBundle::new(entries, processing_time))
}

fn decode_v1(
    payload: &[u8],
    cursor: &mut usize,
    resolvers: &ResolverChain,
) -> Result<IngredientBundle, IngredientCodecError> {
    let processing_time = read_processing_time(payload, cursor)?;
    let count = read_u8(payload, cursor)?;
    let mut entries = Vec::<Ingredient>::with_capacity(count as usize);
    for _ in 0..count {
        let material = read_string(payload, cursor)?;
        let flags = read_u8(payload, cursor)?;
        if flags & !HAS_VARIANT != 0 {
            return Err(invalid_format("unknown entry flags"));
        }
        let variant = if flags & HAS_VARIANT != 0 {
            Some(read_i16(payload, cursor)?)
        } else {
            None
        };
        let amount = read_i32(payload, cursor)?;
        let amount = u32::try_from(amount).map_err(|_| invalid_format("negative amount"))?;
        if let Some(material) = resolvers.resolve(&material) {
            entries.push(Ingredient {
                material,
                variant,
                amount,
            });
        }
    }
    Ok(IngredientBundle::new(entries, processing_time))
}

pub fn encode_ingredients(bundle: &IngredientBundle) -> Result<String, IngredientCodecError> {
    encode_ingredients_with_version(bundle, CURRENT_BLOB_VERSION)
}

pub fn encode_ingredients_with_version(
    bundle: &IngredientBundle,
    version: u8,
) -> Result<String, IngredientCodecError> {
    if !SUPPORTED_BLOB_VERSIONS.contains(&version) {
        return Err(IngredientCodecError::UnsupportedVersion(version));
    }
    let count = u8::try_from(bundle.entries.len())
        .map_err(|_| unencodable("more than 255 ingredient entries"))?;
    let processing_time = i32::try_from(bundle.processing_time)
        .map_err(|_| unencodable("processing time exceeds i32"))?;

    let mut bytes = vec![version];
    bytes.extend_from_slice(&processing_time.to_be_bytes());
    bytes.push(count);
    for entry in &bundle.entries {
        write_string(&mut bytes, &entry.material)?;
        if version == 0 {
            let variant = match entry.variant {
                None => 0,
                Some(0) => return Err(unencodable("variant 0 is reserved in version 0")),
                Some(variant) => variant,
            };
            let amount = i16::try_from(entry.amount)
                .map_err(|_| unencodable("amount exceeds i16 in version 0"))?;
            bytes.extend_from_slice(&variant.to_be_bytes());
            bytes.extend_from_slice(&amount.to_be_bytes());
        } else {
            match entry.variant {
                Some(variant) => {
                    bytes.push(HAS_VARIANT);
                    bytes.extend_from_slice(&variant.to_be_bytes());
                }
                None => bytes.push(0),
            }
            let amount =
                i32::try_from(entry.amount).map_err(|_| unencodable("amount exceeds i32"))?;
            bytes.extend_from_slice(&amount.to_be_bytes());
        }
    }
    Ok(base91::encode(&bytes))
}

fn read_processing_time(bytes: &[u8], cursor: &mut usize) -> Result<u32, IngredientCodecError> {
    let raw = read_i32(bytes, cursor)?;
    u32::try_from(raw).map_err(|_| invalid_format("negative processing time"))
}

fn write_string(target: &mut Vec<u8>, value: &MaterialId) -> Result<(), IngredientCodecError> {
    let bytes = value.as_str().as_bytes();
    let len = u16::try_from(bytes.len()).map_err(|_| unencodable("material name too long"))?;
    target.extend_from_slice(&len.to_be_bytes());
    target.extend_from_slice(bytes);
    Ok(())
}

fn read_string(bytes: &[u8], cursor: &mut usize) -> Result<String, IngredientCodecError> {
    let len = u16::from_be_bytes(read_array(bytes, cursor)?) as usize;
    let raw = read_exact(bytes, cursor, len)?;
    std::str::from_utf8(raw)
        .map(|value| value.to_string())
        .map_err(|_| invalid_format("invalid UTF-8 material name"))
}

fn read_u8(bytes: &[u8], cursor: &mut usize) -> Result<u8, IngredientCodecError> {
    let [value] = read_array::<1>(bytes, cursor)?;
    Ok(value)
}

fn read_i16(bytes: &[u8], cursor: &mut usize) -> Result<i16, IngredientCodecError> {
    Ok(i16::from_be_bytes(read_array(bytes, cursor)?))
}

fn read_i32(bytes: &[u8], cursor: &mut usize) -> Result<i32, IngredientCodecError> {
    Ok(i32::from_be_bytes(read_array(bytes, cursor)?))
}

fn read_array<const N: usize>(
    bytes: &[u8],
    cursor: &mut usize,
) -> Result<[u8; N], IngredientCodecError> {
    read_exact(bytes, cursor, N)?
        .try_into()
        .map_err(|_| invalid_format("invalid integer encoding"))
}

fn read_exact<'a>(
    bytes: &'a [u8],
    cursor: &mut usize,
    len: usize,
) -> Result<&'a [u8], IngredientCodecError> {
    let end = cursor.saturating_add(len);
    if end > bytes.len() {
        return Err(invalid_format("unexpected end of blob"));
    }
    let out = &bytes[*cursor..end];
    *cursor = end;
    Ok(out)
}

fn invalid_format(message: &str) -> IngredientCodecError {
    IngredientCodecError::InvalidFormat(message.to_string())
}

fn unencodable(message: &str) -> IngredientCodecError {
    IngredientCodecError::Unencodable(message.to_string())
}
