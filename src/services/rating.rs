// Agrégat des notes d'un titre: somme entière + nombre de notes.
// La moyenne est toujours recalculée depuis la somme (pas de dérive flottante).

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RatingAggregate {
    pub sum: i64,
    pub count: i32,
}

impl RatingAggregate {
    pub fn new(sum: i64, count: i32) -> Self {
        Self { sum, count }
    }

    /// 0 quand aucune note n'est comptée
    pub fn average(&self) -> f64 {
        if self.count <= 0 {
            0.0
        } else {
            self.sum as f64 / self.count as f64
        }
    }

    pub fn add(self, rating: i32) -> Self {
        Self {
            sum: self.sum + i64::from(rating),
            count: self.count + 1,
        }
    }

    pub fn remove(self, rating: i32) -> Self {
        if self.count <= 1 {
            return Self::default();
        }
        Self {
            sum: self.sum - i64::from(rating),
            count: self.count - 1,
        }
    }

    pub fn replace(self, old: i32, new: i32) -> Self {
        Self {
            sum: self.sum - i64::from(old) + i64::from(new),
            count: self.count,
        }
    }
}
