use starix::geometry::BoundingBox;
use starix::rstar_tree::RStarTree;

fn rect(lo: (f64, f64), hi: (f64, f64)) -> BoundingBox {
    BoundingBox::new(vec![lo.0, lo.1], vec![hi.0, hi.1])
}

fn main() {
    // Create a new R*-tree for 2D boxes with between 2 and 4 entries per node.
    let mut tree: RStarTree<&str> = RStarTree::new(2, 2, 4).unwrap();
    println!("--- 2D R*-Tree Example ---");

    // Index a few named regions.
    tree.insert("park", rect((0.0, 0.0), (4.0, 3.0))).unwrap();
    tree.insert("lake", rect((5.0, 1.0), (9.0, 4.0))).unwrap();
    tree.insert("forest", rect((2.0, 5.0), (7.0, 9.0))).unwrap();
    tree.insert("village", rect((8.0, 6.0), (10.0, 8.0))).unwrap();
    tree.insert("fields", rect((3.0, 2.0), (6.0, 6.0))).unwrap();
    println!("Indexed {} regions, tree height {}", tree.len(), tree.height());

    // Find everything that overlaps a query window.
    let window = rect((3.5, 2.5), (5.5, 5.5));
    println!("Regions overlapping {:?}:", window);
    for (name, mbr) in tree.search(&window) {
        println!("  {name}: {:?}", mbr);
    }

    // Clear an area and show what is left.
    let cleared = tree.delete_in_area(&rect((4.5, 0.0), (10.0, 4.5)));
    println!("Cleared {cleared} region(s) in the south-east");
    let everything = rect((-1.0, -1.0), (11.0, 11.0));
    for (name, _) in tree.search(&everything) {
        println!("  remaining: {name}");
    }

    // A 3D tree works the same way.
    println!("\n--- 3D R*-Tree Example ---");
    let mut space: RStarTree<u32> = RStarTree::new(3, 2, 4).unwrap();
    for i in 0..10u32 {
        let c = f64::from(i);
        space
            .insert(i, BoundingBox::new(vec![c, c, c], vec![c + 1.5, c + 1.5, c + 1.5]))
            .unwrap();
    }
    let probe = BoundingBox::new(vec![4.0, 4.0, 4.0], vec![6.0, 6.0, 6.0]);
    let hits = space.search(&probe);
    println!("{} boxes overlap the probe cube", hits.len());
}
