use thiserror::Error;

const ALPHABET: &[u8; 91] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!#$%&()*+,./:;<=>?@[]^_`{|}~\"";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Base91Error {
    #[error("character {character:?} at offset {offset} is not part of the basE91 alphabet")]
    InvalidCharacter { character: char, offset: usize },
}

pub fn encode(bytes: &[u8]) -> String {
    let mut output = String::with_capacity(bytes.len() * 123 / 100 + 2);
    let mut queue = 0u32;
    let mut bits = 0u32;
    for &byte in bytes {
        queue |= u32::from(byte) << bits;
        bits += 8;
        if bits > 13 {
            let mut value = queue & 8191;
            if value > 88 {
                queue >>= 13;
                bits -= 13;
            } else {
                value = queue & 16383;
                queue >>= 14;
                bits -= 14;
            }
            output.push(ALPHABET[(value % 91) as usize] as char);
            output.push(ALPHABET[(value / 91) as usize] as char);
        }
    }
    if bits > 0 {
        output.push(ALPHABET[(queue % 91) as usize] as char);
        if bits > 7 || queue > 90 {
            output.push(ALPHABET[(queue / 91) as usize] as char);
        }
    }
    output
}

pub fn decode(text: &str) -> Result<Vec<u8>, Base91Error> {
    let mut output = Vec::<u8>::with_capacity(text.len() * 7 / 8 + 1);
    let mut queue = 0u32;
    let mut bits = 0u32;
    let mut pending: Option<u32> = None;

    for (offset, character) in text.char_indices() {
        if character.is_ascii_whitespace() {
            continue;
        }
        let digit = decode_digit(character).ok_or(Base91Error::InvalidCharacter {
            character,
            offset,
        })?;
        match pending.take() {
            None => pending = Some(digit),
            Some(low) => {
                let value = low + digit * 91;
                queue |= value << bits;
                bits += if value & 8191 > 88 { 13 } else { 14 };
                while bits > 7 {
                    output.push((queue & 0xff) as u8);
                    queue >>= 8;
                    bits -= 8;
                }
            }
        }
    }
    if let Some(low) = pending {
        output.push(((queue | low << bits) & 0xff) as u8);
    }
    Ok(output)
}

fn decode_digit(character: char) -> Option<u32> {
    if !character.is_ascii() {
        return None;
    }
    ALPHABET
        .iter()
        .position(|&candidate| candidate == character as u8)
        .map(|index| index as u32)
}
