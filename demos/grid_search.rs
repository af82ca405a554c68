use starix::geometry::BoundingBox;
use starix::rstar_tree::{Entry, Node, RStarTree};

// Walks the tree through its inspection hook and prints one line per node and
// leaf entry, indented by depth.
fn print_tree<T: std::fmt::Debug>(node: &Node<T>, depth: usize) {
    let pad = "    ".repeat(depth);
    let cover = node.mbr();
    println!(
        "{pad}{} cover={:?}",
        if node.leaf_level { "Leaf node:" } else { "Node:" },
        cover.as_ref().map(|b| (b.lo().to_vec(), b.hi().to_vec()))
    );
    for entry in &node.entries {
        match entry {
            Entry::Leaf { mbr, value } => {
                println!("{pad}    Value = {:?}, Box = {:?}/{:?}", value, mbr.lo(), mbr.hi());
            }
            Entry::Inner { child, .. } => print_tree(child, depth + 1),
        }
    }
}

fn main() {
    let mut tree: RStarTree<(usize, usize)> = RStarTree::new(2, 2, 4).unwrap();
    for i in 0..6 {
        for j in 0..6 {
            let cell = BoundingBox::new(
                vec![i as f64, j as f64],
                vec![i as f64 + 1.0, j as f64 + 1.0],
            );
            tree.insert((i, j), cell).unwrap();
        }
    }

    println!("Grid of {} cells, height {}:", tree.len(), tree.height());
    print_tree(tree.root_for_inspection(), 0);

    let window = BoundingBox::new(vec![1.5, 1.5], vec![3.5, 3.5]);
    let mut cells: Vec<(usize, usize)> = tree.search(&window).iter().map(|(c, _)| **c).collect();
    cells.sort_unstable();
    println!("\nCells overlapping {:?}/{:?}: {:?}", window.lo(), window.hi(), cells);
}
