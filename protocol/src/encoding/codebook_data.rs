//! Sentence tables for the compiled-in v2.0 codebook.
//!
//! A slot's 64 sentences are `"{lead} {topic} {tail}."`, where the slot's
//! family (`slot % 4`) picks the lead and tail tables, the high three bits
//! of the value pick the lead and the low three bits pick the tail. Every
//! one of the 6592 sentences is distinct after normalization because each
//! slot has its own topic.
//!
//! Editing anything here is a codebook version change.

use crate::config::STEGO_SLOT_COUNT;

pub(super) const FAMILIES: usize = 4;

pub(super) const LEADS: [[&str; 8]; FAMILIES] = [
    [
        "Honestly, I think",
        "As far as I can tell,",
        "My impression is that",
        "From what I have seen,",
        "Looking back on it,",
        "To be perfectly fair,",
        "If I am being candid,",
        "Between the two of us,",
    ],
    [
        "Someone mentioned recently that",
        "It turns out that",
        "Oddly enough,",
        "Last time I checked,",
        "By most accounts,",
        "In my experience,",
        "For what it is worth,",
        "Around here, everybody agrees that",
    ],
    [
        "I keep noticing that",
        "My neighbor insists that",
        "Apparently,",
        "Believe it or not,",
        "Just between friends,",
        "According to my notes,",
        "Without exaggerating,",
        "Thinking about it more,",
    ],
    [
        "Interestingly,",
        "As I mentioned before,",
        "Every so often I realize that",
        "Not surprisingly,",
        "In hindsight,",
        "More often than not,",
        "Funny enough,",
        "If memory serves,",
    ],
];

pub(super) const TAILS: [[&str; 8]; FAMILIES] = [
    [
        "needs a little more attention than we originally planned",
        "has been running smoothly for quite a while now",
        "still feels like a work in progress to me",
        "came up again during yesterday's conversation",
        "deserves more credit than it usually receives",
        "turned out better than anyone expected",
        "could use a fresh pair of eyes next week",
        "is probably worth revisiting before the holidays",
    ],
    [
        "was the highlight of an otherwise ordinary afternoon",
        "reminded me how much small details matter",
        "caused a surprising amount of friendly debate",
        "has quietly become part of the daily routine",
        "was discussed at length over lunch",
        "seems to improve a little every single month",
        "keeps drawing people in for some reason",
        "made the whole week feel more manageable",
    ],
    [
        "looked especially lovely in the early evening light",
        "has a charm that is hard to describe",
        "is nothing like what the brochure promised",
        "needed far less maintenance than we feared",
        "left a lasting impression on the visitors",
        "became the center of attention for a while",
        "has slowly grown on most of the team",
        "still surprises me whenever I stop to notice",
    ],
    [
        "took longer to sort out than anybody guessed",
        "works remarkably well once you get used to it",
        "sparked a long and thoughtful conversation",
        "was mentioned in passing at the last gathering",
        "deserves a proper write-up at some point",
        "ended up being the easiest part of the project",
        "has been the subject of many cheerful complaints",
        "continues to be a reliable source of stories",
    ],
];

pub(super) const TOPICS: [&str; STEGO_SLOT_COUNT] = [
    "the new onboarding guide",
    "our weekly planning session",
    "the garden behind the office",
    "the coffee machine upstairs",
    "the community library downtown",
    "the bicycle path along the river",
    "my grandmother's soup recipe",
    "the quarterly budget review",
    "the renovated train station",
    "the farmers market on Saturdays",
    "the neighborhood book club",
    "the old lighthouse museum",
    "the school fundraising committee",
    "the volunteer cleanup crew",
    "the hiking trail near the lake",
    "our shared photo archive",
    "the revised vacation policy",
    "the corner bakery on Elm Street",
    "the evening pottery workshop",
    "the local weather forecast",
    "the holiday decoration contest",
    "our family reunion schedule",
    "the office plant collection",
    "the kitchen remodeling plan",
    "the annual charity marathon",
    "the downtown parking situation",
    "the customer feedback survey",
    "the neighborhood watch newsletter",
    "the museum's new sculpture exhibit",
    "our backyard vegetable patch",
    "the jazz festival lineup",
    "the choir rehearsal schedule",
    "the apartment building elevator",
    "the campus orientation program",
    "the rooftop terrace garden",
    "the monthly potluck dinner",
    "the community swimming pool",
    "the photography club exhibition",
    "the public transit timetable",
    "the children's reading hour",
    "the woodworking shop downstairs",
    "the regional history society",
    "the spring cleaning checklist",
    "the hospital visitor lounge",
    "the town hall renovation",
    "the weekend soccer league",
    "the dog park by the stadium",
    "our anniversary dinner reservation",
    "the science fair project",
    "the bakery's sourdough starter",
    "the mountain cabin rental",
    "the morning yoga class",
    "the neighborhood recycling program",
    "the quilting circle at church",
    "the film society screening",
    "the seasonal menu at the bistro",
    "the language exchange meetup",
    "the new hiking boots I bought",
    "the office holiday party",
    "the vintage record store",
    "the harbor boat tour",
    "the city marathon route",
    "the art supply cabinet",
    "the tenant association meeting",
    "the old family photo album",
    "the chess tournament bracket",
    "the cafeteria lunch rotation",
    "the greenhouse on the hill",
    "the knitting group's latest project",
    "the retirement party planning",
    "the scenic overlook parking lot",
    "the puppet theater performance",
    "the community radio station",
    "the backyard treehouse",
    "the bird feeder by the window",
    "the dentist's waiting room",
    "the summer reading challenge",
    "the conference keynote speech",
    "the bakery's cinnamon rolls",
    "the laundromat on Fifth Avenue",
    "the gym's new rowing machines",
    "the wedding seating chart",
    "the botanical garden tour",
    "the afternoon tea tradition",
    "the neighborhood block party",
    "the carpool arrangement",
    "the water fountain in the plaza",
    "the flea market on the pier",
    "the orchestra's spring concert",
    "the pizza place near campus",
    "the ice skating rink downtown",
    "the family game night",
    "the library's used book sale",
    "the apple orchard upstate",
    "the hardware store's new owner",
    "the crossword puzzle club",
    "the sunset cruise along the coast",
    "the travel itinerary for June",
    "the kindergarten art show",
    "the new traffic roundabout",
    "the campfire storytelling night",
    "the amateur astronomy club",
    "the cooking class at the community center",
];
