use brain_dispatch::dispatch;
use proptest::prelude::*;

proptest! {
    /// Order preservation (§8): for N fan-out calls, result[i] corresponds to input[i].
    #[test]
    fn order_preservation(values in prop::collection::vec(any::<i32>(), 0..64), cap in 1usize..8) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let expected: Vec<i32> = values.iter().map(|v| v.wrapping_mul(2)).collect();
        let results = rt.block_on(dispatch(values, cap, |_i, v| async move { v.wrapping_mul(2) }));
        prop_assert_eq!(results, expected);
    }
}
