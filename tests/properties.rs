use f2gauss::{F2Matrix, MatrixError, Region, RowColumnSearch};
use proptest::prelude::*;
use rand::{rngs::SmallRng, SeedableRng};

/// A matrix with at most 64 columns, built from one word per row.
fn small_matrix() -> impl Strategy<Value = F2Matrix> {
    (1usize..=8, 1usize..=64)
        .prop_flat_map(|(n, m)| {
            let mask = if m == 64 { u64::MAX } else { (1u64 << m) - 1 };
            (
                Just(m),
                proptest::collection::vec(any::<u64>().prop_map(move |w| w & mask), n),
            )
        })
        .prop_map(|(m, words)| F2Matrix::from_words(m, &words).unwrap())
}

proptest! {
    #[test]
    fn transpose_is_an_involution(a in small_matrix()) {
        let mut t = a.clone();
        t.transpose();
        t.transpose();
        prop_assert_eq!(t, a);
    }

    #[test]
    fn adding_a_matrix_to_itself_gives_zero(a in small_matrix()) {
        let mut sum = a.clone();
        sum.add(&a).unwrap();
        prop_assert!(sum.is_zero());
    }

    #[test]
    fn identity_is_a_left_and_right_unit(a in small_matrix()) {
        let left = F2Matrix::identity(a.rows());
        let right = F2Matrix::identity(a.cols());
        prop_assert_eq!(&(&left * &a), &a);
        prop_assert_eq!(&(&a * &right), &a);
    }

    #[test]
    fn addition_commutes(a in small_matrix(), seed in any::<u64>()) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let b = F2Matrix::random(&mut rng, a.rows(), a.cols());
        let mut ab = a.clone();
        ab.add(&b).unwrap();
        let mut ba = b.clone();
        ba.add(&a).unwrap();
        prop_assert_eq!(ab, ba);
    }

    #[test]
    fn multiplication_distributes_over_addition(seed in any::<u64>()) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let a = F2Matrix::random(&mut rng, 9, 17);
        let b = F2Matrix::random(&mut rng, 9, 17);
        let c = F2Matrix::random(&mut rng, 17, 5);

        let mut lhs = a.clone();
        lhs.add(&b).unwrap();
        lhs.mul(&c).unwrap();

        let mut rhs = &a * &c;
        rhs.add(&(&b * &c)).unwrap();

        prop_assert_eq!(lhs, rhs);
    }

    #[test]
    fn column_permutations_are_orthogonal(n in 1usize..100, seed in any::<u64>()) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut a = F2Matrix::identity(n);
        let p = a.permute_cols_with(&mut rng);
        prop_assert_eq!(&p * &p.transposed(), F2Matrix::identity(n));
        // I · P = A_after, so permuting the identity yields the permutation itself
        prop_assert_eq!(a, p);
    }

    #[test]
    fn permuted_matrix_is_the_product_with_p(a in small_matrix(), seed in any::<u64>()) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let a0 = a.clone();
        let mut b = a;
        let p = b.permute_cols_with(&mut rng);
        prop_assert_eq!(&a0 * &p, b);
    }

    #[test]
    fn full_elimination_of_an_invertible_matrix_gives_identity(
        n in 2usize..40,
        seed in any::<u64>(),
    ) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut a = F2Matrix::random_invertible(&mut rng, n);
        a.gaussian_elimination();
        prop_assert_eq!(a, F2Matrix::identity(n));
    }

    #[test]
    fn rank_never_exceeds_either_dimension(a in small_matrix()) {
        let r = a.rank();
        prop_assert!(r <= a.rows());
        prop_assert!(r <= a.cols());
    }

    #[test]
    fn rescue_elimination_is_accounted_by_g_and_p(seed in any::<u64>()) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let a0 = F2Matrix::random(&mut rng, 8, 8);
        let mut a = a0.clone();
        let region = Region::new(0, 0, 7, 5);
        match a.partial_gaussian_with_rescue(region, &mut RowColumnSearch) {
            Ok((g, p)) => {
                prop_assert!(a.check_gaussian(0, 0, 6));
                prop_assert_eq!(&(&g * &a0) * &p, a);
            }
            Err(e) => prop_assert_eq!(e, MatrixError::UnresolvableDependency),
        }
    }

    #[test]
    fn submatrix_roundtrips_through_set_submatrix(seed in any::<u64>()) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let a = F2Matrix::random(&mut rng, 20, 130);
        let sub = a.submatrix(3, 70, 17, 120).unwrap();
        let mut b = a.clone();
        b.set_submatrix(&sub, 3, 70).unwrap();
        prop_assert_eq!(b, a);
    }
}
