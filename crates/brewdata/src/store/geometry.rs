use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordError {
    #[error("expected {expected} components separated by '/', found {found}")]
    Arity { expected: usize, found: usize },
    #[error("component '{token}' is not a valid number")]
    InvalidNumber { token: String },
}

impl BlockPos {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn parse_slashed(raw: &str) -> Result<Self, CoordError> {
        let parts = raw.split('/').collect::<Vec<_>>();
        if parts.len() != 3 {
            return Err(CoordError::Arity {
                expected: 3,
                found: parts.len(),
            });
        }
        Ok(Self {
            x: parse_int(parts[0])?,
            y: parse_int(parts[1])?,
            z: parse_int(parts[2])?,
        })
    }
}

fn parse_int(token: &str) -> Result<i32, CoordError> {
    token
        .trim()
        .parse::<i32>()
        .map_err(|_| CoordError::InvalidNumber {
            token: token.to_string(),
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    pub min: BlockPos,
    pub max: BlockPos,
}

impl BoundingBox {
    pub fn new(x1: i32, y1: i32, z1: i32, x2: i32, y2: i32, z2: i32) -> Self {
        Self {
            min: BlockPos::new(x1.min(x2), y1.min(y2), z1.min(z2)),
            max: BlockPos::new(x1.max(x2), y1.max(y2), z1.max(z2)),
        }
    }

    pub fn from_points(flat: &[i32]) -> Option<Self> {
        if flat.is_empty() || flat.len() % 3 != 0 {
            return None;
        }
        let mut min = BlockPos::new(i32::MAX, i32::MAX, i32::MAX);
        let mut max = BlockPos::new(i32::MIN, i32::MIN, i32::MIN);
        for point in flat.chunks_exact(3) {
            min.x = min.x.min(point[0]);
            min.y = min.y.min(point[1]);
            min.z = min.z.min(point[2]);
            max.x = max.x.max(point[0]);
            max.y = max.y.max(point[1]);
            max.z = max.z.max(point[2]);
        }
        Some(Self { min, max })
    }

    pub fn contains(&self, pos: BlockPos) -> bool {
        (self.min.x..=self.max.x).contains(&pos.x)
            && (self.min.y..=self.max.y).contains(&pos.y)
            && (self.min.z..=self.max.z).contains(&pos.z)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundsEncoding<'a> {
    Explicit(&'a str),
    LegacyPoints {
        stairs: &'a str,
        wood: Option<&'a str>,
    },
    Absent,
}

pub fn reconstruct_bounds(encoding: BoundsEncoding<'_>) -> Option<BoundingBox> {
    match encoding {
        BoundsEncoding::Explicit(raw) => {
            let values = parse_int_list(&split_list(raw))?;
            match values.as_slice() {
                [x1, y1, z1, x2, y2, z2] => Some(BoundingBox::new(*x1, *y1, *z1, *x2, *y2, *z2)),
                _ => None,
            }
        }
        BoundsEncoding::LegacyPoints { stairs, wood } => {
            let mut tokens = split_list(stairs);
            let wood_tokens = wood.map(split_list).unwrap_or_default();
            // A single wood token is what old writers left behind for "no wood data".
            if wood_tokens.len() > 1 {
                tokens.extend(wood_tokens);
            }
            BoundingBox::from_points(&parse_int_list(&tokens)?)
        }
        BoundsEncoding::Absent => None,
    }
}

/// Comma split that drops trailing empty tokens but keeps a lone empty token,
/// so `""` yields one element and `"1,2,3,"` yields three.
fn split_list(raw: &str) -> Vec<&str> {
    let mut tokens = raw.split(',').map(str::trim).collect::<Vec<_>>();
    while tokens.len() > 1 && tokens.last().is_some_and(|token| token.is_empty()) {
        tokens.pop();
    }
    tokens
}

fn parse_int_list(tokens: &[&str]) -> Option<Vec<i32>> {
    tokens
        .iter()
        .map(|token| token.parse::<i32>().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_bounds_are_order_independent() {
        let forward = reconstruct_bounds(BoundsEncoding::Explicit("1,2,3,10,20,30")).expect("box");
        let reversed = reconstruct_bounds(BoundsEncoding::Explicit("10,20,30,1,2,3")).expect("box");
        let mixed = reconstruct_bounds(BoundsEncoding::Explicit("10,2,30,1,20,3")).expect("box");
        assert_eq!(forward, reversed);
        assert_eq!(forward, mixed);
        assert_eq!(forward.min, BlockPos::new(1, 2, 3));
        assert_eq!(forward.max, BlockPos::new(10, 20, 30));
    }

    #[test]
    fn explicit_bounds_require_exactly_six_integers() {
        assert!(reconstruct_bounds(BoundsEncoding::Explicit("1,2,3,4,5")).is_none());
        assert!(reconstruct_bounds(BoundsEncoding::Explicit("1,2,3,4,5,6,7")).is_none());
        assert!(reconstruct_bounds(BoundsEncoding::Explicit("1,2,3,4,5,x")).is_none());
        assert!(reconstruct_bounds(BoundsEncoding::Explicit("")).is_none());
    }

    #[test]
    fn single_wood_token_is_ignored() {
        let stairs = "0,64,0,4,66,3";
        let alone = reconstruct_bounds(BoundsEncoding::LegacyPoints {
            stairs,
            wood: None,
        })
        .expect("stairs only");
        for wood in ["", "99", "-500"] {
            let with_wood = reconstruct_bounds(BoundsEncoding::LegacyPoints {
                stairs,
                wood: Some(wood),
            })
            .expect("stairs plus lone wood token");
            assert_eq!(with_wood, alone, "wood={wood:?}");
        }
    }

    #[test]
    fn wood_points_extend_the_volume() {
        let bounds = reconstruct_bounds(BoundsEncoding::LegacyPoints {
            stairs: "0,64,0,4,66,3",
            wood: Some("-2,70,1"),
        })
        .expect("box");
        assert_eq!(bounds.min, BlockPos::new(-2, 64, 0));
        assert_eq!(bounds.max, BlockPos::new(4, 70, 3));
        assert!(bounds.contains(BlockPos::new(0, 68, 2)));
        assert!(!bounds.contains(BlockPos::new(5, 68, 2)));
    }

    #[test]
    fn malformed_legacy_points_yield_no_volume() {
        for stairs in ["", "1,2", "1,2,3,4", "1,two,3"] {
            assert!(
                reconstruct_bounds(BoundsEncoding::LegacyPoints { stairs, wood: None }).is_none(),
                "stairs={stairs:?}"
            );
        }
        assert!(reconstruct_bounds(BoundsEncoding::Absent).is_none());
    }

    #[test]
    fn trailing_comma_is_tolerated() {
        let bounds = reconstruct_bounds(BoundsEncoding::LegacyPoints {
            stairs: "1,2,3,",
            wood: None,
        })
        .expect("box");
        assert_eq!(bounds.min, bounds.max);
    }

    #[test]
    fn slashed_block_position_parses_or_reports() {
        assert_eq!(
            BlockPos::parse_slashed("-12/64/300"),
            Ok(BlockPos::new(-12, 64, 300))
        );
        assert_eq!(
            BlockPos::parse_slashed("1/2"),
            Err(CoordError::Arity {
                expected: 3,
                found: 2
            })
        );
        assert!(matches!(
            BlockPos::parse_slashed("1/b/3"),
            Err(CoordError::InvalidNumber { .. })
        ));
    }
}
