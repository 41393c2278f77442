use caption_search_lib::caption::BoundedTopSet;
use caption_search_lib::{Candidate, CaptionError};

fn scored(token: u32, probability: f32) -> Candidate<(), ()> {
    Candidate::initial(0, (), None).extend(token, probability, (), None)
}

#[test]
fn retains_capacity_highest_regardless_of_push_order() {
    let scores: Vec<i64> = (0..20).map(|i| (i * 37) % 101).collect();
    let mut expected = scores.clone();
    expected.sort_unstable_by(|a, b| b.cmp(a));
    expected.truncate(5);

    for rotation in 0..scores.len() {
        let mut order = scores.clone();
        order.rotate_left(rotation);
        let mut set = BoundedTopSet::new(5).unwrap();
        for s in order {
            set.push(s).unwrap();
        }
        assert_eq!(set.extract(true).unwrap(), expected);
    }
}

#[test]
fn candidates_are_ranked_by_score() {
    let mut set = BoundedTopSet::new(2).unwrap();
    for (token, p) in [(2, 0.1), (3, 0.6), (4, 0.3), (5, 0.05)] {
        set.push(scored(token, p)).unwrap();
    }
    let best: Vec<u32> = set
        .extract(true)
        .unwrap()
        .iter()
        .map(|c| c.last_token())
        .collect();
    assert_eq!(best, vec![3, 4]);
}

#[test]
fn double_extract_without_reset_fails() {
    let mut set = BoundedTopSet::new(3).unwrap();
    set.push(scored(2, 0.5)).unwrap();
    assert_eq!(set.extract(false).unwrap().len(), 1);
    assert!(matches!(
        set.extract(false),
        Err(CaptionError::InvalidState(_))
    ));
}

#[test]
fn reset_reopens_an_empty_set() {
    let mut set = BoundedTopSet::new(1).unwrap();
    set.push(1).unwrap();
    set.extract(true).unwrap();
    set.reset();
    assert_eq!(set.size().unwrap(), 0);
    assert!(set.extract(true).unwrap().is_empty());
}
