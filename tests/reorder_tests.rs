use chrono::Utc;
use luzon::models::ChecklistItem;
use luzon::ordering::{move_item, reorder, sequential_orders};
use uuid::Uuid;

fn checklist(n: usize) -> Vec<ChecklistItem> {
    let project_id = Uuid::new_v4();
    (0..n)
        .map(|i| ChecklistItem {
            id: Uuid::new_v4(),
            project_id,
            text: format!("step {}", i),
            completed: false,
            item_order: i as f64,
            created_at: Utc::now(),
        })
        .collect()
}

// Every from/to pair: orders stay 0..n-1, the moved item lands at `to`,
// and the rest keep their relative order.
#[test]
fn moving_to_any_position_renumbers_sequentially() {
    let n = 5;
    for from in 0..n {
        for to in 0..n {
            let mut items = checklist(n);
            let original: Vec<Uuid> = items.iter().map(|i| i.id).collect();
            let moved = original[from];

            let writes = reorder(&mut items, from, to);
            for item in items.iter_mut() {
                if let Some((_, order)) = writes.iter().find(|(id, _)| *id == item.id) {
                    item.item_order = *order;
                }
            }

            let orders: Vec<f64> = items.iter().map(|i| i.item_order).collect();
            assert_eq!(orders, (0..n).map(|i| i as f64).collect::<Vec<_>>());
            assert_eq!(items[to].id, moved);

            let rest: Vec<Uuid> = items.iter().map(|i| i.id).filter(|id| *id != moved).collect();
            let expected: Vec<Uuid> = original.iter().copied().filter(|id| *id != moved).collect();
            assert_eq!(rest, expected);
        }
    }
}

#[test]
fn sequential_orders_follow_list_position() {
    let mut items = checklist(3);
    move_item(&mut items, 2, 0);
    let orders = sequential_orders(&items);
    assert_eq!(orders[0], (items[0].id, 0.0));
    assert_eq!(orders[2], (items[2].id, 2.0));
}
