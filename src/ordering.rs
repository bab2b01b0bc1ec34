use uuid::Uuid;

use crate::models::ChecklistItem;

/// A row with a persisted sort key
pub trait Ordered {
    fn id(&self) -> Uuid;
    fn order_key(&self) -> f64;
}

impl Ordered for ChecklistItem {
    fn id(&self) -> Uuid {
        self.id
    }

    fn order_key(&self) -> f64 {
        self.item_order
    }
}

/// Moves the element at `from` to `to`, keeping everything else in order.
/// `to` past the end places the element last.
pub fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) {
    if from >= items.len() {
        return;
    }
    let item = items.remove(from);
    let to = to.min(items.len());
    items.insert(to, item);
}

pub fn sequential_orders<T: Ordered>(items: &[T]) -> Vec<(Uuid, f64)> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| (item.id(), i as f64))
        .collect()
}

/// Applies a move and returns the rows whose key changed.
pub fn reorder<T: Ordered>(items: &mut Vec<T>, from: usize, to: usize) -> Vec<(Uuid, f64)> {
    let before: Vec<(Uuid, f64)> = items.iter().map(|i| (i.id(), i.order_key())).collect();
    move_item(items, from, to);

    sequential_orders(items)
        .into_iter()
        .filter(|(id, order)| {
            before
                .iter()
                .find(|(old_id, _)| old_id == id)
                .map_or(true, |(_, old)| old != order)
        })
        .collect()
}

/// Key for a new row appended after `items`
pub fn next_order_key<T: Ordered>(items: &[T]) -> f64 {
    items
        .iter()
        .map(Ordered::order_key)
        .fold(None, |max: Option<f64>, k| Some(max.map_or(k, |m| m.max(k))))
        .unwrap_or(0.0)
        + 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct Row {
        id: Uuid,
        order: f64,
    }

    impl Ordered for Row {
        fn id(&self) -> Uuid {
            self.id
        }

        fn order_key(&self) -> f64 {
            self.order
        }
    }

    fn rows(n: usize) -> Vec<Row> {
        (0..n)
            .map(|i| Row { id: Uuid::new_v4(), order: i as f64 })
            .collect()
    }

    #[test]
    fn move_down_preserves_others() {
        let mut items = rows(5);
        let ids: Vec<Uuid> = items.iter().map(|r| r.id).collect();

        move_item(&mut items, 1, 3);

        let got: Vec<Uuid> = items.iter().map(|r| r.id).collect();
        assert_eq!(got, vec![ids[0], ids[2], ids[3], ids[1], ids[4]]);
    }

    #[test]
    fn move_past_end_goes_last() {
        let mut items = rows(3);
        let first = items[0].id;
        move_item(&mut items, 0, 10);
        assert_eq!(items[2].id, first);
    }

    #[test]
    fn reorder_only_reports_changed_rows() {
        let mut items = rows(4);
        let ids: Vec<Uuid> = items.iter().map(|r| r.id).collect();

        let writes = reorder(&mut items, 2, 1);

        assert_eq!(writes, vec![(ids[2], 1.0), (ids[1], 2.0)]);
    }

    #[test]
    fn reorder_renumbers_sparse_keys() {
        let mut items = vec![
            Row { id: Uuid::new_v4(), order: 1.0 },
            Row { id: Uuid::new_v4(), order: 2.0 },
            Row { id: Uuid::new_v4(), order: 7.5 },
        ];

        let writes = reorder(&mut items, 0, 0);

        let orders: Vec<f64> = writes.iter().map(|(_, o)| *o).collect();
        assert_eq!(orders, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn next_key_is_max_plus_one() {
        assert_eq!(next_order_key::<Row>(&[]), 1.0);
        let items = vec![
            Row { id: Uuid::new_v4(), order: 4.0 },
            Row { id: Uuid::new_v4(), order: 2.0 },
        ];
        assert_eq!(next_order_key(&items), 5.0);
    }
}
