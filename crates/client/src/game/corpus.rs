//! The synthetic chat-message corpus.
//!
//! A fixed set of canned messages posing as chat. Selection favors the
//! least-used entries so long sessions do not repeat themselves, and the
//! corpus doubles as the fingerprint list the router uses to keep a real
//! chatter's echo of a canned phrase out of the hidden pool.

#[cfg(test)]
#[path = "corpus_test.rs"]
mod corpus_test;

use rand::Rng;

/// One canned message with its usage count.
#[derive(Debug, Clone)]
pub struct SyntheticMessage {
    pub id: &'static str,
    pub text: &'static str,
    pub used_count: u32,
}

/// The corpus with per-message usage tracking.
#[derive(Debug, Clone)]
pub struct Corpus {
    messages: Vec<SyntheticMessage>,
}

impl Default for Corpus {
    fn default() -> Self {
        Self {
            messages: SYNTHETIC_MESSAGES
                .iter()
                .map(|(id, text)| SyntheticMessage {
                    id,
                    text,
                    used_count: 0,
                })
                .collect(),
        }
    }
}

impl Corpus {
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[SyntheticMessage] {
        &self.messages
    }

    /// Whether a chat text matches a canned phrase (exact, or the canned
    /// phrase appears inside the text).
    pub fn matches(&self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        self.messages
            .iter()
            .any(|m| m.text == text || text.contains(m.text))
    }

    /// Pick a message for a round: sort by usage, take the least-used
    /// quartile (at least 3) as candidates, choose uniformly among them
    /// and bump the winner's count.
    pub fn select<R: Rng + ?Sized>(&mut self, rng: &mut R) -> String {
        let mut order: Vec<usize> = (0..self.messages.len()).collect();
        order.sort_by_key(|&i| self.messages[i].used_count);

        let candidates = (self.messages.len() / 4).max(3).min(order.len());
        let winner = order[rng.gen_range(0..candidates)];

        self.messages[winner].used_count += 1;
        self.messages[winner].text.to_string()
    }
}

/// The canned messages.
pub const SYNTHETIC_MESSAGES: [(&str, &str); 100] = [
    ("ai1", "Have you tried turning it off and on again?"),
    ("ai2", "I can't believe they're adding another battle royale game to the market"),
    ("ai3", "This stream is so entertaining, I've been watching for hours!"),
    ("ai4", "The new patch completely ruined my favorite character"),
    ("ai5", "Does anyone know when the next big gaming event is?"),
    ("ai6", "I think the streamer needs to adjust their audio settings"),
    ("ai7", "That was an amazing play! How did you manage to pull that off?"),
    ("ai8", "I've been a subscriber for three months now and I love the content!"),
    ("ai9", "This game has the best graphics I've seen all year"),
    ("ai10", "Can we see your gaming setup? I'm curious what peripherals you use"),
    ("ai11", "I tried that strategy yesterday and it completely failed for me"),
    ("ai12", "The loading times in this game are ridiculous"),
    ("ai13", "What's your opinion on the controversial change in the latest update?"),
    ("ai14", "I just got here, what did I miss?"),
    ("ai15", "My internet keeps dropping today, so frustrating"),
    ("ai16", "Do you have any recommendations for a good gaming chair?"),
    ("ai17", "That was so unlucky! You should have won that match"),
    ("ai18", "I can't understand why people are hating on this game, it's fantastic"),
    ("ai19", "What's your favorite game of all time?"),
    ("ai20", "The developers need to fix the servers ASAP"),
    ("ai21", "monkaS bro this stream is getting intense!! cant believe what just happened"),
    ("ai22", "KEKW did you see that fail? absolute disaster but im here for it"),
    ("ai23", "wait did that actually just happen lol"),
    ("ai24", "poggers!! just got my first win of the day, feeling cracked rn"),
    ("ai25", "anyone else having buffer issues or just me?"),
    ("ai26", "ngl this convo is giving very demure, very mindful energy and i respect it"),
    ("ai27", "touch grass my dude, youve been streaming for 12 hours straight"),
    ("ai28", "that was actually super wholesome"),
    ("ai29", "skill issue tbh, maybe try getting better at the game?? just a thought"),
    ("ai30", "sheeeesh that play was clean af, clip that someone!!"),
    ("ai31", "yo who else is watching this at 3am instead of sleeping"),
    ("ai32", "copium levels are off the charts in this chat lmaooo"),
    ("ai33", "sadge... missed the drop by 2 seconds, pain is all i know"),
    ("ai34", "W take, based opinion, you dropped this king 👑"),
    ("ai35", "yall are sleeping on this game fr, its actually fire"),
    ("ai36", "im just here vibing and farming LULW in the chat"),
    ("ai37", "the stream quality today is top tier"),
    ("ai38", "bruh moment fr fr, cant believe what im seeing rn"),
    ("ai39", "lowkey this stream is a vibe, might stay here all night tbh"),
    ("ai40", "ratio + L + you fell off + didnt ask"),
    ("ai41", "im literally deceased 💀 this is too funny cant breathe"),
    ("ai42", "first time chatter, long time lurker, love the content!"),
    ("ai43", "this is giving major red flag energy, yikes"),
    ("ai44", "no cap, this is straight bussin fr fr"),
    ("ai45", "weird champ behavior in chat today, mods do your thing"),
    ("ai46", "anyone here from tiktok?"),
    ("ai47", "the delulu is the solulu as they say, keep dreaming bestie"),
    ("ai48", "this chat is moving so fast no one will see that i love my mom"),
    ("ai49", "greetings from germany! 3am here but worth staying up for"),
    ("ai50", "lets gooooo! hype train incoming, choo choo!"),
    ("ai51", "BRO that dodge was INSANE PogChamp"),
    ("ai52", "lmaooo chat's wildin today"),
    ("ai53", "!lurk gonna watch while i eat dinner"),
    ("ai54", "RIPBOZO to that boss you just destroyed"),
    ("ai55", "anyone know what gpu they're using??"),
    ("ai56", "BatChest I LOOOOOVE THIS SONG"),
    ("ai57", "yo mod can we get a timeout on that guy spamming"),
    ("ai58", "KEKW KEKW KEKW"),
    ("ai59", "that's cap and you know it"),
    ("ai60", "PauseChamp ..."),
    ("ai61", "NEW FROG ALERT LUL"),
    ("ai62", "guys stop backseat gaming fr"),
    ("ai63", "AYOOOO WTF WAS THAT monkaW"),
    ("ai64", "just followed! love the content"),
    ("ai65", "this games actually mid ngl"),
    ("ai66", "HUH???? how did that not hit??"),
    ("ai67", "modCheck where gameplay"),
    ("ai68", "RIPBOZO chat's dead tonight"),
    ("ai69", "nice..... 69 viewers LUL"),
    ("ai70", "EZ Clap"),
    ("ai71", "widepeepoHappy so cute!!"),
    ("ai72", "Yo i just subbed and my name didn't show up on screen??"),
    ("ai73", "OMEGALUL HE DOESN'T KNOW"),
    ("ai74", "drop your socials bro i wanna follow"),
    ("ai75", "the rizz is immaculate sheeeesh"),
    ("ai76", "this is why we can't have nice things chat"),
    ("ai77", "Madge i missed the beginning"),
    ("ai78", "!song"),
    ("ai79", "someone gift me a sub plsssss"),
    ("ai80", "ok but the REAL ONES remember the minecraft streams"),
    ("ai81", "Great points being made today."),
    ("ai82", "I hadn't thought of it that way. Good perspective."),
    ("ai83", "Did anyone catch that documentary on Netflix?"),
    ("ai84", "I see your point, though I view it differently."),
    ("ai85", "Thanks for the clear explanation."),
    ("ai86", "Been following this topic for months. So interesting."),
    ("ai87", "Anyone else from the East Coast? It's late here!"),
    ("ai88", "Love the quality conversations here."),
    ("ai89", "Curious what everyone thinks about the recent changes."),
    ("ai90", "This gives me a lot to think about. Thanks all."),
    ("ai91", "Nice to see civil discussion for once!"),
    ("ai92", "Long-time viewer, first-time chatter. Hello everyone!"),
    ("ai93", "What's everyone drinking tonight?"),
    ("ai94", "This topic is fascinating. Thanks for covering it."),
    ("ai95", "Just subbed with Prime!"),
    ("ai96", "The historical context really helps here."),
    ("ai97", "Anyone else having audio issues?"),
    ("ai98", "Could you explain that last point again?"),
    ("ai99", "This community has taught me so much."),
    ("ai100", "Both sides make valid arguments here."),
];
