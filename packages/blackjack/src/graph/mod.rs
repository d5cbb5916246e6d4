use std::collections::{HashMap, VecDeque};

use log::debug;
use serde::Serialize;

use crate::card::{CardId, CardSet};
use crate::hand::{
    add_card_totals, effective_score, is_natural, FinalScore, HandKey, Lineage, BLACKJACK_SCORE,
    MAX_SCORE,
};
use crate::{CasinoRules, EngineError};

/// Arena index of a hand state.
pub type HandId = usize;

/// A transition: draw `card`, land on `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub card: CardId,
    pub to: HandId,
}

/// How many cards a state stands for, and what they were where it matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    /// A lone card: a dealer up-card.
    Single(CardId),
    /// A dealt two-card hand, cards in ascending id order.
    Dealt([CardId; 2]),
    /// A two-card hand made by splitting `origin` and drawing `drawn`.
    Split { origin: CardId, drawn: CardId },
    /// Three or more cards. From here only the totals matter.
    Drawn,
}

impl Shape {
    pub fn card_count(&self) -> usize {
        match self {
            Shape::Single(_) => 1,
            Shape::Dealt(_) | Shape::Split { .. } => 2,
            Shape::Drawn => 3,
        }
    }

    pub fn lineage(&self) -> Lineage {
        match self {
            Shape::Split { .. } => Lineage::Split,
            _ => Lineage::Dealt,
        }
    }
}

/// One node of the hand graph. Every field is fixed at construction.
#[derive(Debug, Clone, Serialize)]
pub struct HandState {
    pub id: HandId,
    pub key: HandKey,
    pub shape: Shape,
    pub all_totals: Vec<u8>,
    pub effective_score: u8,
    pub is_bust: bool,
    pub is_blackjack: bool,
    pub is_soft: bool,
    pub can_double: bool,
    pub can_split: bool,
    /// Split aces that may not draw again
    pub forced_stand: bool,
    pub is_active: bool,
    pub children: Vec<Edge>,
    pub split_children: Vec<Edge>,
}

impl HandState {
    pub fn final_score(&self) -> FinalScore {
        if self.is_blackjack {
            FinalScore::Blackjack
        } else if self.is_bust {
            FinalScore::Bust
        } else {
            FinalScore::Total(self.effective_score)
        }
    }

    pub fn lowest_total(&self) -> u8 {
        self.all_totals.first().copied().unwrap_or(0)
    }

    pub fn is_single(&self) -> bool {
        matches!(self.shape, Shape::Single(_))
    }

    pub fn is_post_split(&self) -> bool {
        self.shape.lineage() == Lineage::Split
    }

    /// The card a pair consists of.
    pub fn pair_card(&self) -> Option<CardId> {
        match self.shape {
            Shape::Dealt([a, b]) if a == b => Some(a),
            _ => None,
        }
    }
}

/// The de-duplicated DAG of every reachable hand state under one rule set.
#[derive(Debug, Clone, Serialize)]
pub struct HandGraph {
    nodes: Vec<HandState>,
    #[serde(skip)]
    index: HashMap<HandKey, HandId>,
    /// Children before parents
    order: Vec<HandId>,
    /// Indexed by card id
    up_cards: Vec<HandId>,
    initial_hands: Vec<HandId>,
}

impl HandGraph {
    /// Enumerate every state reachable from single cards and dealt pairs of cards.
    pub fn build(cards: &CardSet, rules: &CasinoRules) -> Result<Self, EngineError> {
        let mut builder = Builder {
            cards,
            rules,
            nodes: Vec::new(),
            index: HashMap::new(),
            queue: VecDeque::new(),
        };

        let up_cards: Vec<HandId> = cards
            .ids()
            .map(|c| builder.intern(Shape::Single(c), add_card_totals(&[0], &cards.get(c).values)))
            .collect();

        let mut initial_hands = Vec::new();
        for a in cards.ids() {
            for b in a..cards.len() {
                let totals = add_card_totals(&cards.get(a).values, &cards.get(b).values);
                initial_hands.push(builder.intern(Shape::Dealt([a, b]), totals));
            }
        }

        while let Some(id) = builder.queue.pop_front() {
            builder.expand(id);
        }

        let Builder { nodes, index, .. } = builder;
        check_draw_edges(&nodes)?;
        let order = dependency_order(&nodes)?;
        debug!(
            "Hand graph: {} states, {} dealt hands",
            nodes.len(),
            initial_hands.len()
        );

        Ok(Self {
            nodes,
            index,
            order,
            up_cards,
            initial_hands,
        })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: HandId) -> &HandState {
        &self.nodes[id]
    }

    pub fn nodes(&self) -> &[HandState] {
        &self.nodes
    }

    /// A hand of two or more cards by key; single cards are reached through [`Self::up_card`].
    pub fn find(&self, key: &str) -> Option<&HandState> {
        self.index
            .get(&HandKey::from(key))
            .map(|&id| &self.nodes[id])
    }

    pub fn up_card(&self, card: CardId) -> HandId {
        self.up_cards[card]
    }

    /// Every two-card hand the player can be dealt.
    pub fn initial_hands(&self) -> &[HandId] {
        &self.initial_hands
    }

    /// Ids in dependency order: every state after all its draw and split children.
    pub fn order(&self) -> &[HandId] {
        &self.order
    }

    /// Resolve every state once, children first.
    ///
    /// `resolve` sees the values of already-resolved states; asking for one
    /// that is not resolved yet is an invariant violation.
    pub fn backward_induction<T, F>(&self, mut resolve: F) -> Result<Vec<T>, EngineError>
    where
        F: FnMut(&HandState, &Resolved<T>) -> Result<T, EngineError>,
    {
        let mut resolved = Resolved {
            values: (0..self.nodes.len()).map(|_| None).collect(),
        };
        for &id in &self.order {
            let value = resolve(&self.nodes[id], &resolved)?;
            resolved.values[id] = Some(value);
        }
        resolved
            .values
            .into_iter()
            .enumerate()
            .map(|(id, value)| {
                value.ok_or_else(|| {
                    EngineError::InvariantViolation(format!("state {id} was never resolved"))
                })
            })
            .collect()
    }
}

/// Values produced so far by [`HandGraph::backward_induction`].
pub struct Resolved<T> {
    values: Vec<Option<T>>,
}

impl<T> Resolved<T> {
    pub fn get(&self, id: HandId) -> Result<&T, EngineError> {
        self.values
            .get(id)
            .and_then(Option::as_ref)
            .ok_or_else(|| {
                EngineError::InvariantViolation(format!("state {id} used before it was resolved"))
            })
    }
}

struct Builder<'a> {
    cards: &'a CardSet,
    rules: &'a CasinoRules,
    nodes: Vec<HandState>,
    index: HashMap<HandKey, HandId>,
    queue: VecDeque<HandId>,
}

impl Builder<'_> {
    fn key(&self, shape: Shape, totals: &[u8]) -> HandKey {
        match shape {
            Shape::Single(c) => HandKey::single(self.cards, c),
            Shape::Dealt([a, b]) => HandKey::dealt(self.cards, a, b),
            Shape::Split { origin, drawn } => HandKey::split(self.cards, origin, drawn),
            Shape::Drawn => HandKey::drawn(totals),
        }
    }

    /// Existing state for this composition, or a new queued one.
    ///
    /// Single cards stay out of the index: a lone "6" and a drawn hard 6 share
    /// the same text.
    fn intern(&mut self, shape: Shape, totals: Vec<u8>) -> HandId {
        let key = self.key(shape, &totals);
        let indexed = !matches!(shape, Shape::Single(_));
        if let Some(&id) = self.index.get(&key).filter(|_| indexed) {
            return id;
        }
        let id = self.nodes.len();
        let state = self.derive(id, key.clone(), shape, totals);
        self.nodes.push(state);
        if indexed {
            self.index.insert(key, id);
        }
        self.queue.push_back(id);
        id
    }

    fn derive(&self, id: HandId, key: HandKey, shape: Shape, all_totals: Vec<u8>) -> HandState {
        let split = &self.rules.split_options;
        let natural = is_natural(shape.card_count(), &all_totals);
        let is_blackjack = match shape {
            Shape::Dealt(_) => natural,
            Shape::Split { .. } => natural && split.blackjack_after_split,
            _ => false,
        };
        let score = effective_score(&all_totals);
        let effective_score = if is_blackjack { BLACKJACK_SCORE } else { score };
        let is_bust = !is_blackjack && score > MAX_SCORE;
        let is_soft = all_totals.len() > 1;
        let forced_stand = match shape {
            Shape::Split { origin, .. } => {
                self.cards.get(origin).is_ace() && !split.hit_split_aces
            }
            _ => false,
        };
        let is_active = !is_bust && !is_blackjack && score < MAX_SCORE && !forced_stand;
        let can_double = is_active
            && match shape {
                Shape::Dealt(_) => self.rules.doubling_mode.allows(score, is_soft),
                Shape::Split { .. } => {
                    split.double_after_split && self.rules.doubling_mode.allows(score, is_soft)
                }
                _ => false,
            };
        let can_split = split.allowed
            && !is_blackjack
            && !is_bust
            && matches!(shape, Shape::Dealt([a, b]) if a == b);

        HandState {
            id,
            key,
            shape,
            all_totals,
            effective_score,
            is_bust,
            is_blackjack,
            is_soft,
            can_double,
            can_split,
            forced_stand,
            is_active,
            children: Vec::new(),
            split_children: Vec::new(),
        }
    }

    fn expand(&mut self, id: HandId) {
        let (shape, totals, is_active, can_split) = {
            let node = &self.nodes[id];
            (
                node.shape,
                node.all_totals.clone(),
                node.is_active,
                node.can_split,
            )
        };

        if is_active {
            let mut children = Vec::with_capacity(self.cards.len());
            for card in self.cards.ids() {
                let next_totals = add_card_totals(&totals, &self.cards.get(card).values);
                let next_shape = match shape {
                    Shape::Single(first) => {
                        Shape::Dealt([first.min(card), first.max(card)])
                    }
                    _ => Shape::Drawn,
                };
                let to = self.intern(next_shape, next_totals);
                children.push(Edge { card, to });
            }
            self.nodes[id].children = children;
        }

        if let (true, Shape::Dealt([origin, _])) = (can_split, shape) {
            let origin_values = self.cards.get(origin).values.clone();
            let mut split_children = Vec::with_capacity(self.cards.len());
            for drawn in self.cards.ids() {
                let next_totals = add_card_totals(&origin_values, &self.cards.get(drawn).values);
                let to = self.intern(Shape::Split { origin, drawn }, next_totals);
                split_children.push(Edge { card: drawn, to });
            }
            self.nodes[id].split_children = split_children;
        }
    }
}

/// The lowest total strictly grows along every draw edge, so draws never cycle.
fn check_draw_edges(nodes: &[HandState]) -> Result<(), EngineError> {
    for node in nodes {
        for edge in &node.children {
            let child = &nodes[edge.to];
            if child.lowest_total() <= node.lowest_total() {
                return Err(EngineError::InvariantViolation(format!(
                    "draw edge {} -> {} does not raise the lowest total",
                    node.key, child.key
                )));
            }
        }
    }
    Ok(())
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Resolved,
}

/// Post-order over draw and split edges, with a cycle check.
fn dependency_order(nodes: &[HandState]) -> Result<Vec<HandId>, EngineError> {
    let mut marks = vec![Mark::Unvisited; nodes.len()];
    let mut order = Vec::with_capacity(nodes.len());

    for root in 0..nodes.len() {
        if marks[root] != Mark::Unvisited {
            continue;
        }
        // (state, index of the next outgoing edge to visit)
        let mut stack = vec![(root, 0usize)];
        marks[root] = Mark::InProgress;
        while let Some(top) = stack.last_mut() {
            let (id, next) = *top;
            top.1 += 1;
            let node = &nodes[id];
            match node.children.iter().chain(&node.split_children).nth(next) {
                Some(edge) => match marks[edge.to] {
                    Mark::Unvisited => {
                        marks[edge.to] = Mark::InProgress;
                        stack.push((edge.to, 0));
                    }
                    Mark::InProgress => {
                        return Err(EngineError::InvariantViolation(format!(
                            "cycle through {} -> {}",
                            node.key, nodes[edge.to].key
                        )));
                    }
                    Mark::Resolved => {}
                },
                None => {
                    marks[id] = Mark::Resolved;
                    order.push(id);
                    stack.pop();
                }
            }
        }
    }
    Ok(order)
}
