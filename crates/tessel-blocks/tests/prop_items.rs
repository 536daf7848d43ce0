use proptest::prelude::*;
use tessel_blocks::*;

proptest! {
    // border copies (-w) classify exactly like the block they mirror
    #[test]
    fn sign_does_not_change_category(w in -127i8..=127) {
        prop_assert_eq!(is_transparent(w), is_transparent(-w));
        prop_assert_eq!(is_plant(w), is_plant(-w));
        prop_assert_eq!(is_obstacle(w), is_obstacle(-w));
        prop_assert_eq!(block_tiles(w), block_tiles(-w));
    }

    // every tile lands inside the 16x16 atlas
    #[test]
    fn tiles_in_atlas(w in any::<i8>()) {
        for t in block_tiles(w) {
            prop_assert!(t < 256);
        }
        prop_assert!(plant_tile(w) < 256);
    }

    // plants are see-through and never obstacles
    #[test]
    fn plants_are_soft(w in TALL_GRASS..=BLUE_FLOWER) {
        prop_assert!(is_plant(w));
        prop_assert!(is_transparent(w));
        prop_assert!(!is_obstacle(w));
        prop_assert!(is_destructable(w));
    }
}

#[test]
fn placeable_items_are_destructable() {
    for &w in PLACEABLE {
        assert!(is_destructable(w), "item {w}");
    }
}
