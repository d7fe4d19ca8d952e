//! Bit-level helpers shared by the calendar, weekday and quantity decoders.
//!
//! Masks are always read least-significant bit first: bit `0` flags the first
//! unit (day 1, quantity 1, Sunday), bit `1` the second, and so on.

/// Returns `true` when bit `index` (zero-based from the least-significant bit)
/// is set in `mask`.
///
/// Indices at or beyond the mask width read as unset.
pub fn bit_is_set(mask: u64, index: u32) -> bool {
    mask.checked_shr(index).is_some_and(|shifted| shifted & 1 == 1)
}

/// Lists `index + base` for every set bit of `mask`, in ascending order.
///
/// Numbers that would not fit in a `u32` are left out.
///
/// ```
/// use ticketswitch::bitmask_to_numbered_list;
///
/// assert_eq!(bitmask_to_numbered_list(126, 1), vec![2, 3, 4, 5, 6, 7]);
/// assert!(bitmask_to_numbered_list(0, 1).is_empty());
/// ```
pub fn bitmask_to_numbered_list(mask: u64, base: u32) -> Vec<u32> {
    let width = u64::BITS - mask.leading_zeros();
    (0..width)
        .filter(|&index| bit_is_set(mask, index))
        .filter_map(|index| base.checked_add(index))
        .collect()
}
