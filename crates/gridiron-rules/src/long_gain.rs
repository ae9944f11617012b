//! The long-gain roller shared by the chart `LG` token, kickoff returns and
//! punts.

use crate::rng::GameRng;

/// 1d6 long-gain table. The last face is open-ended.
pub const LONG_GAIN_TABLE: [i32; 6] = [30, 30, 35, 40, 45, 50];

/// Face whose +50 result adds `10 × 1d6` more.
const OPEN_ENDED_FACE: u32 = 6;

/// Roll a long gain: `+30..+50`, and `+50` adds another `10 × 1d6`.
pub fn roll_long_gain(rng: &mut GameRng) -> i32 {
    let face = rng.d6();
    let base = LONG_GAIN_TABLE[(face - 1) as usize];
    if face == OPEN_ENDED_FACE {
        base + 10 * rng.d6() as i32
    } else {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_gains_stay_in_range() {
        let mut rng = GameRng::from_seed(3);
        for _ in 0..2_000 {
            let y = roll_long_gain(&mut rng);
            assert!((30..=110).contains(&y), "{y}");
        }
    }

    #[test]
    fn open_ended_face_adds_more() {
        let mut rng = GameRng::from_seed(11);
        let big = (0..2_000).map(|_| roll_long_gain(&mut rng)).max().unwrap();
        assert!(big > 50);
    }
}
