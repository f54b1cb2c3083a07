use crate::core::Rating;

/// Sort by rating (highest first) and assign competition ranks.
///
/// Equal ratings keep their input order and share a rank; the next distinct
/// rating takes its 1-based position, so ties produce 1, 2, 2, 4.
pub fn assign_ranks(mut ratings: Vec<Rating>) -> Vec<Rating> {
    // Stable, so the input order breaks ties
    ratings.sort_by(|a, b| b.rating.total_cmp(&a.rating));

    for i in 0..ratings.len() {
        ratings[i].rank = if i > 0 && ratings[i].rating == ratings[i - 1].rating {
            ratings[i - 1].rank
        } else {
            i as u32 + 1
        };
    }

    ratings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranked(values: &[(&str, f64)]) -> Vec<(String, u32)> {
        let ratings = values
            .iter()
            .map(|(name, rating)| Rating::new(*name, *rating, 1))
            .collect();
        assign_ranks(ratings)
            .into_iter()
            .map(|r| (r.player_name, r.rank))
            .collect()
    }

    #[test]
    fn test_competition_ranking_with_ties() {
        let ranks: Vec<u32> = ranked(&[("A", 1200.0), ("B", 1100.0), ("C", 1100.0), ("D", 1050.0)])
            .into_iter()
            .map(|(_, rank)| rank)
            .collect();
        assert_eq!(ranks, vec![1, 2, 2, 4]);
    }

    #[test]
    fn test_sorts_descending() {
        let result = ranked(&[("Low", 900.0), ("High", 1100.0), ("Mid", 1000.0)]);
        assert_eq!(
            result,
            vec![
                ("High".to_string(), 1),
                ("Mid".to_string(), 2),
                ("Low".to_string(), 3),
            ]
        );
    }

    #[test]
    fn test_ties_keep_input_order() {
        let result = ranked(&[("Second", 1000.0), ("First", 1000.0), ("Top", 1010.0)]);
        assert_eq!(
            result,
            vec![
                ("Top".to_string(), 1),
                ("Second".to_string(), 2),
                ("First".to_string(), 2),
            ]
        );
    }

    #[test]
    fn test_sub_integer_difference_is_not_a_tie() {
        let result = ranked(&[("A", 1000.4), ("B", 1000.2)]);
        assert_eq!(result[1].1, 2);
    }

    #[test]
    fn test_all_tied_and_empty() {
        let ranks: Vec<u32> = ranked(&[("A", 1000.0), ("B", 1000.0), ("C", 1000.0)])
            .into_iter()
            .map(|(_, rank)| rank)
            .collect();
        assert_eq!(ranks, vec![1, 1, 1]);

        assert!(assign_ranks(Vec::new()).is_empty());
    }
}
